//! Shared fixtures for contract integration tests.

#![allow(dead_code)]

use acmc_auth::fixtures::*;
use acmc_auth::{identity_from_public_key, RsaSigner, SignedMessage};
use acmc_contract::{AccessControlContract, AccessLog, ContractResult, Decision, InvokeResponse};
use acmc_ledger::MemoryLedger;
use chrono::{DateTime, TimeZone, Utc};

/// A client holding a key pair; its identity is derived from the public key.
pub struct User {
    /// Identity string
    pub id: String,
    /// PEM public key
    pub public_key: &'static str,
    signer: RsaSigner,
}

impl User {
    fn new(public_key: &'static str, private_key: &'static str) -> Self {
        Self {
            id: identity_from_public_key(public_key),
            public_key,
            signer: RsaSigner::from_pem(private_key).expect("fixture private key"),
        }
    }

    pub fn alice() -> Self {
        Self::new(ALICE_PUBLIC_KEY, ALICE_PRIVATE_KEY)
    }

    pub fn bob() -> Self {
        Self::new(BOB_PUBLIC_KEY, BOB_PRIVATE_KEY)
    }

    pub fn carol() -> Self {
        Self::new(CAROL_PUBLIC_KEY, CAROL_PRIVATE_KEY)
    }

    /// Signature over the identity alone (resource creation).
    pub fn sign_identity(&self) -> String {
        self.signer
            .sign(&SignedMessage::identity_only(&self.id))
            .expect("sign identity")
    }

    /// Signature over identity ++ content id (grants and checks).
    pub fn sign_binding(&self, content_id: &str) -> String {
        self.signer
            .sign(&SignedMessage::ownership_binding(&self.id, content_id))
            .expect("sign binding")
    }
}

/// Fixed timestamp `secs` seconds after a base instant.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// A contract hosted on a fresh in-memory ledger.
pub struct TestFixture {
    pub contract: AccessControlContract,
    pub ledger: MemoryLedger,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            contract: AccessControlContract::default(),
            ledger: MemoryLedger::new(),
        }
    }

    pub async fn submit(&self, function: &str, args: &[&str]) -> ContractResult<InvokeResponse> {
        self.contract.submit(&self.ledger, function, &owned(args)).await
    }

    pub async fn evaluate(&self, function: &str, args: &[&str]) -> ContractResult<InvokeResponse> {
        self.contract.evaluate(&self.ledger, function, &owned(args)).await
    }

    /// Run and commit a call under a chosen transaction id and timestamp.
    pub async fn submit_as(
        &self,
        tx_id: &str,
        time: DateTime<Utc>,
        function: &str,
        args: &[&str],
    ) -> ContractResult<InvokeResponse> {
        let tx = self.ledger.begin_with(tx_id, time);
        let response = self.contract.invoke(&tx, function, &owned(args)).await?;
        tx.commit().await?;
        Ok(response)
    }

    pub async fn register(&self, user: &User, role: &str) -> ContractResult<InvokeResponse> {
        self.submit("Register", &[&user.id, user.public_key, role]).await
    }

    pub async fn create(&self, user: &User, content_id: &str) -> ContractResult<InvokeResponse> {
        self.submit("AddResource", &[&user.sign_identity(), &user.id, content_id])
            .await
    }

    pub async fn grant(&self, user: &User, content_id: &str, operation: &str, roles: &str) -> ContractResult<InvokeResponse> {
        self.submit(
            "AddPerm",
            &[&user.sign_binding(content_id), &user.id, content_id, operation, roles],
        )
        .await
    }

    pub async fn check(&self, user: &User, operation: &str, content_id: &str) -> ContractResult<Decision> {
        let response = self
            .submit(
                "CheckPerm",
                &[&user.sign_binding(content_id), operation, &user.id, content_id],
            )
            .await?;
        Ok(serde_json::from_value(response.payload).expect("decision payload"))
    }

    pub async fn trace(&self, content_id: &str) -> Vec<AccessLog> {
        let response = self.evaluate("TraceCid", &[content_id]).await.expect("trace");
        serde_json::from_value(response.payload).expect("trace payload")
    }
}
