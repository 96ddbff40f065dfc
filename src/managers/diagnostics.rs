// Diagnostic reports from every running Coriolis component.

use super::BaseManager;
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::resource::Resource;

pub struct DiagnosticManager<'a> {
    base: BaseManager<'a>,
}

impl<'a> DiagnosticManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        DiagnosticManager { base }
    }

    /// One report per Coriolis service: application, hostname, packages and
    /// platform information.
    pub fn list(&self) -> Result<Vec<Resource>> {
        let request = ApiRequest::new(Method::Get, "/diagnostics");
        let value = self.base.send_for_key(&request, "diagnostics")?;
        self.base.wrap_list(value, None, true)
    }
}
