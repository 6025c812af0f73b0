use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::package::PackageAvailability;
use boxoffice_domain::seat::Seat;
use boxoffice_domain::section::SectionAvailability;

use crate::domain::repository::CatalogRepository;
use crate::domain::types::EventAvailability;
use crate::error::TicketingServiceError;

pub struct GetPackageAvailabilityUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    pub catalog: C,
    pub clock: K,
}

impl<C, K> GetPackageAvailabilityUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    pub async fn execute(
        &self,
        package_id: Uuid,
    ) -> Result<PackageAvailability, TicketingServiceError> {
        let package = self
            .catalog
            .find_package(package_id)
            .await?
            .ok_or(TicketingServiceError::PackageNotFound)?;
        Ok(package.availability(self.clock.now()))
    }
}

pub struct GetEventAvailabilityUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    pub catalog: C,
    pub clock: K,
}

impl<C, K> GetEventAvailabilityUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    pub async fn execute(&self, event_id: Uuid) -> Result<EventAvailability, TicketingServiceError> {
        let now = self.clock.now();
        let event = self
            .catalog
            .find_event(event_id)
            .await?
            .ok_or(TicketingServiceError::EventNotFound)?;
        let packages = self
            .catalog
            .list_packages(event.id)
            .await?
            .iter()
            .map(|p| p.availability(now))
            .collect();
        let seats = self.catalog.list_seats(event.id).await?;
        let sections = self
            .catalog
            .list_sections(event.id)
            .await?
            .iter()
            .map(|section| SectionAvailability::tally(section, &seats, now))
            .collect();

        Ok(EventAvailability {
            event_id: event.id,
            max_attendees: event.max_attendees,
            registered_count: event.registered_count,
            remaining_capacity: event.remaining_capacity(),
            packages,
            sections,
        })
    }
}

pub struct ListSeatsUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    pub catalog: C,
    pub clock: K,
}

impl<C, K> ListSeatsUseCase<C, K>
where
    C: CatalogRepository,
    K: Clock,
{
    /// Seats with lazy expiry applied: lapsed holds read as available.
    pub async fn execute(&self, event_id: Uuid) -> Result<Vec<Seat>, TicketingServiceError> {
        let now = self.clock.now();
        self.catalog
            .find_event(event_id)
            .await?
            .ok_or(TicketingServiceError::EventNotFound)?;
        let mut seats = self.catalog.list_seats(event_id).await?;
        for seat in &mut seats {
            if seat.is_reservation_expired(now) {
                seat.release()?;
            }
        }
        Ok(seats)
    }
}
