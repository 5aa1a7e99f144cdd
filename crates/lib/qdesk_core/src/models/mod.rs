//! Domain models.
//!
//! These are the records owned by the stores. Request payloads that need
//! field-by-field validation live next to the model they produce.

pub mod account;
pub mod citizen;
pub mod department;
pub mod role;
pub mod token;

pub use account::{Account, AccountProfile, NewAccount};
pub use citizen::{
    Address, AddressInput, Citizen, CitizenPatch, CitizenSummary, ContactDetails,
    ContactDetailsInput, NewCitizen, RegisterCitizen,
};
pub use department::{Department, DepartmentInput, DepartmentSummary, NewDepartment};
pub use role::{PrincipalKind, Role, UnknownRole};
pub use token::{NewServiceToken, ServiceToken, ServiceTokenView, TokenStatus};
