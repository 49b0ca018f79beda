use std::sync::Arc;

use craftads_application::infrastructure_config::Config;
use craftads_application::ports::{
    incoming::{
        auth::AuthUseCase, credits::CreditUseCase, gallery::GalleryUseCase,
        generation::GenerationUseCase, purchases::PurchaseUseCase,
    },
    outgoing::health::DynHealthProbePort,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_use_case: Arc<dyn AuthUseCase>,
    pub credit_use_case: Arc<dyn CreditUseCase>,
    pub purchase_use_case: Arc<dyn PurchaseUseCase>,
    pub generation_use_case: Arc<dyn GenerationUseCase>,
    pub gallery_use_case: Arc<dyn GalleryUseCase>,
    pub health_probe: DynHealthProbePort,
}
