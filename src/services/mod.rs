//! Business logic services
//!
//! Services own the transaction boundaries: every mutation runs inside one
//! `sqlx::Transaction` that is committed on success and rolled back (or
//! dropped) on any failure path.

pub mod availability;
pub mod borrows;
pub mod catalog;
pub mod events;
pub mod inventory;
pub mod users;

use crate::{
    config::{AuthConfig, EventsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityService,
    pub borrows: borrows::BorrowsService,
    pub catalog: catalog::CatalogService,
    pub events: events::EventsService,
    pub inventory: inventory::InventoryService,
    pub users: users::UsersService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, events_config: EventsConfig) -> Self {
        Self {
            availability: availability::AvailabilityService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            events: events::EventsService::new(repository.clone(), events_config),
            inventory: inventory::InventoryService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            repository,
        }
    }
}
