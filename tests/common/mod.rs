//! Shared fakes for integration tests.
//!
//! `FakeChain` simulates a node hosting the LogStore contract: calldata is
//! decoded with the same ABI the service uses, so encoding mistakes show up
//! as test failures rather than being papered over.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tokio::net::TcpListener;

use logstore_gateway::blockchain::contract::{ContractDescriptor, ADD_LOG, COUNT, GET_LOG};
use logstore_gateway::blockchain::{
    BlockchainError, BlockchainResult, ChainGateway, ReceiptStatus, Signer, TransactionReceipt,
    TransactionRequest,
};
use logstore_gateway::lifecycle::Components;
use logstore_gateway::{GatewayConfig, HttpServer, Shutdown};

pub const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
pub const GAS_PRICE: u128 = 1_000_000_000;

/// ABI of the first contract version: `getLog` returns (sender, timestamp, message).
pub const LEGACY_ABI: &str = r#"[
    {"type":"function","name":"addLog","stateMutability":"nonpayable",
     "inputs":[{"name":"message","type":"string"}],"outputs":[]},
    {"type":"function","name":"getLog","stateMutability":"view",
     "inputs":[{"name":"index","type":"uint256"}],
     "outputs":[{"name":"sender","type":"address"},{"name":"timestamp","type":"uint256"},{"name":"message","type":"string"}]},
    {"type":"function","name":"count","stateMutability":"view",
     "inputs":[],"outputs":[{"name":"","type":"uint256"}]}
]"#;

/// An ABI whose `getLog` has a shape no schema version matches.
pub const FIVE_FIELD_ABI: &str = r#"[
    {"type":"function","name":"getLog","stateMutability":"view",
     "inputs":[{"name":"index","type":"uint256"}],
     "outputs":[{"name":"sender","type":"address"},{"name":"timestamp","type":"uint256"},
                {"name":"a","type":"string"},{"name":"b","type":"string"},{"name":"c","type":"string"}]},
    {"type":"function","name":"count","stateMutability":"view",
     "inputs":[],"outputs":[{"name":"","type":"uint256"}]}
]"#;

/// Injected failure modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Every RPC fails as if the node were unreachable.
    pub transport_down: bool,
    /// Mined transactions revert.
    pub revert: bool,
    /// Broadcast transactions are never mined.
    pub never_mine: bool,
    /// Another transaction from the same sender lands right after the nonce is read.
    pub nonce_race: bool,
}

#[derive(Default)]
struct ChainState {
    records: Vec<Vec<DynSolValue>>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    block_number: u64,
}

/// In-memory chain hosting one LogStore contract.
pub struct FakeChain {
    contract: Arc<ContractDescriptor>,
    state: Mutex<ChainState>,
    faults: Mutex<Faults>,
    invocations: AtomicUsize,
    /// Appended right after the next `getLog` is served.
    concurrent_append: Mutex<Option<Vec<DynSolValue>>>,
}

impl FakeChain {
    /// A chain running the current 7-field contract.
    pub fn new() -> Self {
        Self::with_contract(current_contract())
    }

    pub fn with_abi(abi_json: &str) -> Self {
        Self::with_contract(Arc::new(
            ContractDescriptor::from_json(CONTRACT_ADDRESS, abi_json).unwrap(),
        ))
    }

    fn with_contract(contract: Arc<ContractDescriptor>) -> Self {
        Self {
            contract,
            state: Mutex::new(ChainState {
                block_number: 1,
                ..ChainState::default()
            }),
            faults: Mutex::new(Faults::default()),
            invocations: AtomicUsize::new(0),
            concurrent_append: Mutex::new(None),
        }
    }

    pub fn contract(&self) -> Arc<ContractDescriptor> {
        self.contract.clone()
    }

    /// Append a stored record as raw `getLog` output values.
    pub fn seed(&self, values: Vec<DynSolValue>) {
        self.state.lock().unwrap().records.push(values);
    }

    /// Simulate another writer landing a record while a listing is running.
    pub fn append_during_next_read(&self, values: Vec<DynSolValue>) {
        *self.concurrent_append.lock().unwrap() = Some(values);
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    /// Total number of gateway calls made so far.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    fn enter(&self) -> BlockchainResult<Faults> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let faults = *self.faults.lock().unwrap();
        if faults.transport_down {
            return Err(BlockchainError::Transport(
                "error sending request: connection refused".into(),
            ));
        }
        Ok(faults)
    }

    fn execute_add_log(&self, state: &mut ChainState, tx: &TransactionRequest) -> BlockchainResult<()> {
        let function = self.contract.function(ADD_LOG)?;
        let data = tx.call_data.as_ref();
        if data.len() < 4 || data[..4] != function.selector()[..] {
            return Err(BlockchainError::Submission("unknown function selector".into()));
        }
        let args = function
            .abi_decode_input(&data[4..])
            .map_err(|e| BlockchainError::Submission(format!("bad calldata: {}", e)))?;

        let timestamp = GENESIS_TIMESTAMP + state.block_number;
        let mut record = vec![
            DynSolValue::Address(tx.from),
            DynSolValue::Uint(U256::from(timestamp), 256),
        ];
        record.extend(args);
        state.records.push(record);
        Ok(())
    }
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainGateway for FakeChain {
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        let faults = self.enter()?;
        let mut state = self.state.lock().unwrap();
        let nonce = state.nonces.entry(address).or_insert(0);
        let current = *nonce;
        if faults.nonce_race {
            *nonce += 1;
        }
        Ok(current)
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.enter()?;
        Ok(GAS_PRICE)
    }

    async fn send_raw_transaction(&self, signed: Bytes) -> BlockchainResult<TxHash> {
        let faults = self.enter()?;
        let tx: TransactionRequest = serde_json::from_slice(&signed)
            .map_err(|e| BlockchainError::Submission(format!("rlp: {}", e)))?;

        let mut state = self.state.lock().unwrap();
        let expected = state.nonces.get(&tx.from).copied().unwrap_or(0);
        if tx.nonce != expected {
            return Err(BlockchainError::Submission(format!(
                "nonce too low: next nonce {}, tx nonce {}",
                expected, tx.nonce
            )));
        }
        state.nonces.insert(tx.from, expected + 1);

        let tx_hash = keccak256(&signed);
        if faults.never_mine {
            return Ok(tx_hash);
        }

        state.block_number += 1;
        let status = if faults.revert {
            ReceiptStatus::Failed
        } else {
            self.execute_add_log(&mut state, &tx)?;
            ReceiptStatus::Success
        };
        let receipt = TransactionReceipt {
            tx_hash,
            block_number: state.block_number,
            gas_used: 90_000,
            status,
        };
        state.receipts.insert(tx_hash, receipt);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Option<Duration>,
    ) -> BlockchainResult<TransactionReceipt> {
        self.enter()?;
        let receipt = self.state.lock().unwrap().receipts.get(&tx_hash).cloned();
        match (receipt, timeout) {
            (Some(receipt), _) => Ok(receipt),
            (None, Some(wait)) => {
                tokio::time::sleep(wait).await;
                Err(BlockchainError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: wait.as_secs(),
                })
            }
            (None, None) => std::future::pending().await,
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.enter()?;
        if to != self.contract.address() {
            return Ok(Bytes::new());
        }

        let mut state = self.state.lock().unwrap();
        let count = self.contract.function(COUNT)?;
        if data.len() >= 4 && data[..4] == count.selector()[..] {
            let out = count
                .abi_encode_output(&[DynSolValue::Uint(U256::from(state.records.len()), 256)])
                .unwrap();
            return Ok(out.into());
        }

        let get_log = self.contract.function(GET_LOG)?;
        if data.len() >= 4 && data[..4] == get_log.selector()[..] {
            let args = get_log.abi_decode_input(&data[4..]).unwrap();
            let index = match args.as_slice() {
                [DynSolValue::Uint(i, _)] => u64::try_from(*i).map(|i| i as usize).unwrap_or(usize::MAX),
                _ => usize::MAX,
            };
            let record = state.records.get(index).cloned().ok_or_else(|| {
                BlockchainError::CallReverted("execution reverted: index out of range".into())
            })?;
            if let Some(appended) = self.concurrent_append.lock().unwrap().take() {
                state.records.push(appended);
            }
            return Ok(get_log.abi_encode_output(&record).unwrap().into());
        }

        Err(BlockchainError::CallReverted("execution reverted".into()))
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.enter()?;
        Ok(self.state.lock().unwrap().block_number)
    }
}

/// Signer whose "raw transaction" is the JSON form of the request.
pub struct FakeSigner {
    address: Address,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self {
            address: Address::repeat_byte(0xAA),
        }
    }
}

impl FakeSigner {
    /// Checksummed address, as it appears in decoded records.
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }
}

impl Default for FakeSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Signer for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, request: &TransactionRequest) -> BlockchainResult<Bytes> {
        Ok(serde_json::to_vec(request).unwrap().into())
    }
}

pub fn current_contract() -> Arc<ContractDescriptor> {
    Arc::new(ContractDescriptor::load(CONTRACT_ADDRESS, None).unwrap())
}

pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.chain.rpc_url = Some("http://127.0.0.1:8545".into());
    config.chain.contract_address = Some(CONTRACT_ADDRESS.into());
    config.chain.confirmation_timeout_secs = Some(5);
    config
}

/// Components backed by `chain`, with or without a signing credential.
pub fn components(chain: &Arc<FakeChain>, signed: bool) -> Components {
    components_with(&test_config(), chain, signed)
}

pub fn components_with(config: &GatewayConfig, chain: &Arc<FakeChain>, signed: bool) -> Components {
    let signer: Option<Arc<dyn Signer>> = if signed {
        Some(Arc::new(FakeSigner::new()))
    } else {
        None
    };
    Components::assemble(config, chain.clone(), chain.contract(), signer)
}

/// A seeded 7-field record.
pub fn current_record(sender: Address, index: u64, message: &str) -> Vec<DynSolValue> {
    vec![
        DynSolValue::Address(sender),
        DynSolValue::Uint(U256::from(GENESIS_TIMESTAMP + index), 256),
        DynSolValue::String(format!("Dr. {}", index)),
        DynSolValue::String("checkup".into()),
        DynSolValue::String(format!("P-{}", index)),
        DynSolValue::Uint(U256::from(1_690_000_000u64 + index), 256),
        DynSolValue::String(message.into()),
    ]
}

/// Running server; dropping it does not stop the server, call `stop`.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_server(components: &Components) -> TestServer {
    spawn_server_with(&test_config(), components).await
}

pub async fn spawn_server_with(config: &GatewayConfig, components: &Components) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, components.app_state());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer { addr, shutdown }
}
