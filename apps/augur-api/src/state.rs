use std::sync::Arc;

use augur_service::AugurService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AugurService>,
}
impl AppState {
	pub fn new(config: augur_config::Config) -> color_eyre::Result<Self> {
		let service = AugurService::new(config)?;

		Ok(Self::with_service(service))
	}

	pub fn with_service(service: AugurService) -> Self {
		Self { service: Arc::new(service) }
	}
}
