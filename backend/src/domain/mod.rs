//! Domain primitives, rules and services.
//!
//! Purpose: hold the clinic dashboard's pure rules. Nothing in here touches
//! the filesystem or a framework; collaborators are reached through
//! [`ports`].
//!
//! Public surface:
//! - Access side: [`Role`], [`CurrentUser`], [`PermissionKey`],
//!   [`PermissionRequirement`], [`NavigationItem`], [`NavigationSection`],
//!   [`AccessEvaluator`] and [`CollapseState`].
//! - Lifecycle side: [`ConfigurableEntity`], [`EntityCollection`],
//!   [`CatalogueProfile`] and [`EntityLifecycleService`].
//! - [`DomainError`] and [`ErrorCode`], the envelope adapters print.

pub mod access;
pub mod collapse;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod navigation;
pub mod permission;
pub mod ports;
pub mod role;
pub mod user;

pub use self::access::AccessEvaluator;
pub use self::collapse::CollapseState;
pub use self::entity::{
    ConfigurableEntity, ENTITY_CODE_MAX, EntityCode, EntityDraft, EntityId, EntityPatch,
    EntityValidationError, LifecycleState,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::lifecycle::{
    CatalogueProfile, EntityCollection, EntityLifecycleService, EntityRef, LifecycleError,
    LifecycleOutcome, Partition, SeedEntity, partition,
};
pub use self::navigation::{
    LANDING_ROUTE, NavigationItem, NavigationItemDeclaration, NavigationSection,
    NavigationSectionDeclaration, NavigationValidationError, build_navigation, clinic_navigation,
    navigation_from_json,
};
pub use self::permission::{
    PermissionCatalog, PermissionKey, PermissionKeyValidationError, PermissionRequirement,
    clinic_permission_catalog,
};
pub use self::role::{ParseRoleError, Role};
pub use self::user::{CurrentUser, UserId, UserValidationError};
