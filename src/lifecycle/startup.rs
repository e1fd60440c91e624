//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the chain gateway, contract descriptor and optional signer
//! - Wire them into the submitter and query services
//!
//! Fail fast: a missing RPC URL or contract address is fatal. A missing
//! signing key is not; the service starts read-only and every `POST /logs`
//! answers with a configuration error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::contract::ContractDescriptor;
use crate::blockchain::gateway::{ChainGateway, RpcGateway};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::{Signer, Wallet};
use crate::config::GatewayConfig;
use crate::http::server::{submit_wait_limit, AppState};
use crate::logs::{LogQueryService, SubmitterSettings, TransactionSubmitter};

/// Long-lived services shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct Components {
    pub gateway: Arc<dyn ChainGateway>,
    pub contract: Arc<ContractDescriptor>,
    pub submitter: Arc<TransactionSubmitter>,
    pub query: Arc<LogQueryService>,
    request_timeout: Duration,
}

impl Components {
    /// Wire services around an existing gateway and contract.
    pub fn assemble(
        config: &GatewayConfig,
        gateway: Arc<dyn ChainGateway>,
        contract: Arc<ContractDescriptor>,
        signer: Option<Arc<dyn Signer>>,
    ) -> Self {
        let submitter = Arc::new(TransactionSubmitter::new(
            gateway.clone(),
            signer,
            Some(contract.clone()),
            SubmitterSettings::from(&config.chain),
        ));
        let query = Arc::new(LogQueryService::new(gateway.clone(), contract.clone()));

        Self {
            gateway,
            contract,
            submitter,
            query,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            submitter: self.submitter.clone(),
            query: self.query.clone(),
            gateway: self.gateway.clone(),
            submit_wait_limit: submit_wait_limit(self.request_timeout),
        }
    }
}

/// Build all components from configuration and the `PRIVATE_KEY` variable.
pub fn bootstrap(config: &GatewayConfig) -> BlockchainResult<Components> {
    let gateway: Arc<dyn ChainGateway> = Arc::new(RpcGateway::new(&config.chain)?);
    let contract = Arc::new(load_contract(config)?);

    let signer: Option<Arc<dyn Signer>> = match Wallet::from_env()? {
        Some(wallet) => {
            tracing::info!(address = %wallet.address(), "Signing credential loaded");
            Some(Arc::new(wallet))
        }
        None => {
            tracing::warn!("PRIVATE_KEY not set, log submission disabled");
            None
        }
    };

    let components = Components::assemble(config, gateway, contract, signer);
    tracing::info!(
        contract = %components.contract.address(),
        chain_id = config.chain.chain_id,
        "Components initialized"
    );
    Ok(components)
}

/// The configured contract with its ABI, or the bundled ABI.
pub fn load_contract(config: &GatewayConfig) -> BlockchainResult<ContractDescriptor> {
    let address = config
        .chain
        .contract_address
        .as_deref()
        .ok_or_else(|| BlockchainError::Configuration("CONTRACT_ADDRESS not configured".into()))?;

    ContractDescriptor::load(address, config.chain.abi_path.as_deref().map(Path::new))
}
