//! The `paginator` variable payload

use serde::Serialize;
use sonar_core::{PageRequest, SonarError, SonarResult};

/// Requested page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paginator {
    pub page: u32,
    pub records_per_page: u32,
}

impl Paginator {
    pub fn new(page: u32, records_per_page: u32) -> SonarResult<Self> {
        if page == 0 || records_per_page == 0 {
            return Err(SonarError::invalid_argument(
                "page and records_per_page must be positive",
            ));
        }
        Ok(Self {
            page,
            records_per_page,
        })
    }
}

impl From<&PageRequest> for Paginator {
    fn from(request: &PageRequest) -> Self {
        Self {
            page: request.page(),
            records_per_page: request.per_page(),
        }
    }
}
