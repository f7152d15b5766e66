use crate::test_utils::TestIngredient;
use crate::MockContextScheduler;
use crate::MockInventoryStateProbe;
use crate::MockStorageNetwork;
use crate::ObserverTypeConfig;

/// Collaborator bundle built entirely from mockall mocks, for unit tests
/// that script exact collaborator expectations.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct MockTypeConfig;

impl ObserverTypeConfig for MockTypeConfig {
    type I = TestIngredient;

    type N = MockStorageNetwork<Self>;

    type SP = MockInventoryStateProbe;

    type C = MockContextScheduler;
}
