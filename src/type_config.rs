use std::fmt::Debug;

use crate::ContextScheduler;
use crate::IngredientInstance;
use crate::InventoryStateProbe;
use crate::StorageNetwork;

/// Bundles the engine's pluggable collaborator types as associated types,
/// so one type parameter threads them all through the engine.
pub trait ObserverTypeConfig:
    Sync + Send + Sized + Debug + Clone + Copy + Default + Eq + PartialEq + Ord + PartialOrd + 'static
{
    type I: IngredientInstance;

    type N: StorageNetwork<Self>;

    type SP: InventoryStateProbe;

    type C: ContextScheduler;
}

pub mod alias {
    use super::ObserverTypeConfig;

    pub type IOF<T> = <T as ObserverTypeConfig>::I;

    pub type NOF<T> = <T as ObserverTypeConfig>::N;

    pub type SPOF<T> = <T as ObserverTypeConfig>::SP;

    pub type COF<T> = <T as ObserverTypeConfig>::C;
}
