use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use super::InjectedWallet;
use crate::error::RpcError;

pub(crate) const ALICE: &str = "0x0000000000000000000000000000000000000a11";
pub(crate) const BOB: &str = "0x0000000000000000000000000000000000000b0b";

/// Wallet double answering from per-method queues and recording every call.
#[derive(Debug, Default)]
pub(crate) struct ScriptedWallet {
    name: String,
    primary: bool,
    replies: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    calls: Mutex<Vec<(String, Value)>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl ScriptedWallet {
    pub(crate) fn named(name: &str, primary: bool) -> Self {
        Self {
            name: name.to_owned(),
            primary,
            ..Self::default()
        }
    }

    /// A wallet on `chain_id` that authorises `account` without prompting.
    pub(crate) fn on_chain(chain_id: &str, account: &str) -> Self {
        let wallet = Self::named("scripted", true);
        wallet.reply("eth_chainId", Ok(json!(chain_id)));
        wallet.reply("eth_requestAccounts", Ok(json!([account])));
        wallet.reply("eth_accounts", Ok(json!([account])));
        wallet
    }

    pub(crate) fn reply(&self, method: &str, reply: Result<Value, RpcError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_owned())
            .or_default()
            .push_back(reply);
    }

    /// Holds every `method` request until the returned notify fires.
    pub(crate) fn gate(&self, method: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(method.to_owned(), Arc::clone(&notify));
        notify
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }
}

#[async_trait]
impl InjectedWallet for ScriptedWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_primary(&self) -> bool {
        self.primary
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_owned(), params));

        let gate = self.gates.lock().unwrap().get(method).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut replies = self.replies.lock().unwrap();
        let queue = replies.entry(method.to_owned()).or_default();
        // The last scripted reply keeps answering once the queue drains
        match queue.len() {
            0 => Err(RpcError::new(4200, format!("unsupported method {method}"))),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap_or_else(|| Ok(Value::Null)),
        }
    }
}
