//! Domain model.
//!
//! - `case`: cases, cached cases and the enums that classify them
//! - `product`: fulfilment products and search criteria
//! - `dto`: agent-facing requests and responses
//! - `events`: outbound event envelope and payloads
//! - `wire`: shapes exchanged with external services
//! - `mapping`: pure conversions between the above

pub mod case;
pub mod dto;
pub mod events;
pub mod mapping;
pub mod product;
pub mod wire;

pub use case::{
    AddressLevel, AddressType, CachedCase, Case, CaseEvent, CaseType, EstabType, Region,
    UniquePropertyReferenceNumber,
};
pub use dto::{
    CaseStatus, InvalidateCaseRequest, LaunchRequest, ModifyCaseRequest, NewCaseRequest,
    PostalFulfilmentRequest, Reason, RefusalRequest, ResponseDto, SmsFulfilmentRequest,
    UacRequest, UacResponse,
};
pub use events::{Channel, EventEnvelope, EventPayload, EventType, Source};
pub use product::{DeliveryChannel, Product, ProductCriteria, RequestChannel};
pub use wire::{AddressRecord, LaunchData, QuestionnaireId, RegistryCase, RegistryCaseEvent};
