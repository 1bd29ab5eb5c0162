//! Appointment lifecycle core for a practitioner's patient roster.
//!
//! ```text
//!  FilterContext ──► AppointmentRepository::fetch ──► cache (+ loading / error)
//!        │                                              │
//!        └──────────────► filter_appointments ◄─────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!              aggregate (stats)     transition_menu (per row)
//! ```
//!
//! - [`api`]: remote service boundary (`/citas-medicas`)
//! - [`id`]: opaque record identifiers
//! - [`repository`]: cached appointment list and request flags
//! - [`registry`]: appointment state and consultation type catalogs
//! - [`transitions`]: which state changes are offered
//! - [`filter`]: text / status / date-scope filtering
//! - [`stats`]: counts derived from the filtered list
//! - [`service`]: per-session object tying the above together

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod id;
pub mod models;
pub mod notify;
pub mod patient;
pub mod registry;
pub mod repository;
pub mod service;
pub mod stats;
pub mod transitions;

pub use api::{AppointmentGateway, HttpGateway};
pub use config::Config;
pub use error::{AppointmentError, Result};
pub use filter::{DateScope, FilterContext, filter_appointments};
pub use id::Id;
pub use models::{
    Appointment, AppointmentDraft, AppointmentPatch, AppointmentState, ConsultationType,
    FetchFilters, FetchScope, NewAppointment,
};
pub use notify::{LogNotifier, Notice, NoticeLevel, NotificationPort};
pub use patient::{Patient, PatientRoster};
pub use registry::{AppointmentStateRegistry, ConsultationTypeRegistry};
pub use repository::AppointmentRepository;
pub use service::{AppointmentBoard, AppointmentRow, AppointmentService};
pub use stats::{AppointmentStats, aggregate};
pub use transitions::{available_transitions, transition_menu};
