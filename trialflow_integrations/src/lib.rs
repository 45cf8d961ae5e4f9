//! Registry clients implementing `trialflow_core::registry::RegistryClient`.

#[cfg(feature = "clinicaltrials")]
pub mod clinicaltrials;

#[cfg(feature = "clinicaltrials")]
pub use clinicaltrials::ClinicalTrialsClient;
