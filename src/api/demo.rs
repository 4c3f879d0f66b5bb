//! Implements the `Transport` trait with canned responses for demo mode.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole
//! dashboard can be explored, top-to-bottom, without a real bank account or token.

use async_trait::async_trait;

use crate::api::transport::{Transport, Wire};
use crate::error::ApiError;

/// Entering this as the API token selects the demo transport.
pub const DEMO_TOKEN: &str = "__DEMO__";

/// A transport that answers every request from seed data in this module. Routing is by URL
/// substring; writes are acknowledged and discarded.
pub(crate) struct DemoTransport;

#[async_trait]
impl Transport for DemoTransport {
    async fn get(&self, url: &str, _token: &str) -> Result<Wire, ApiError> {
        if url.contains("/util/ping") {
            return Ok(Wire::ok(PING_DATA));
        }
        if url.contains("/transactions") {
            return Ok(Wire::ok(TRANSACTION_DATA));
        }
        if url.contains("/accounts") {
            return Ok(Wire::ok(ACCOUNT_DATA));
        }
        Err(ApiError::InvalidResponse(format!(
            "demo transport has no data for {url}"
        )))
    }

    async fn post(
        &self,
        _url: &str,
        _token: &str,
        _body: serde_json::Value,
    ) -> Result<Wire, ApiError> {
        Ok(Wire {
            status: 204,
            body: String::new(),
        })
    }

    async fn patch(
        &self,
        _url: &str,
        _token: &str,
        _body: serde_json::Value,
    ) -> Result<Wire, ApiError> {
        Ok(Wire {
            status: 204,
            body: String::new(),
        })
    }
}

/// Seed accounts: an everyday account plus two savers, one of them a maybe-buy.
const ACCOUNT_DATA: &str = r##"{
  "data": [
    {
      "type": "accounts",
      "id": "demo-acc-spending",
      "attributes": {
        "displayName": "Spending",
        "accountType": "TRANSACTIONAL",
        "ownershipType": "INDIVIDUAL",
        "balance": { "currencyCode": "AUD", "value": "1057.42", "valueInBaseUnits": 105742 },
        "createdAt": "2023-02-01T09:00:00+11:00"
      }
    },
    {
      "type": "accounts",
      "id": "demo-acc-savings",
      "attributes": {
        "displayName": "Savings",
        "accountType": "SAVER",
        "ownershipType": "INDIVIDUAL",
        "balance": { "currencyCode": "AUD", "value": "8250.00", "valueInBaseUnits": 825000 },
        "createdAt": "2023-02-01T09:00:00+11:00"
      }
    },
    {
      "type": "accounts",
      "id": "demo-acc-maybebuy",
      "attributes": {
        "displayName": "🛍️ Maybe Buy",
        "accountType": "SAVER",
        "ownershipType": "INDIVIDUAL",
        "balance": { "currencyCode": "AUD", "value": "420.69", "valueInBaseUnits": 42069 },
        "createdAt": "2024-05-12T17:30:00+10:00"
      }
    }
  ],
  "links": { "prev": null, "next": null }
}"##;

/// Seed transactions, newest first, including a coalescible transfer pair and a held card
/// authorization.
const TRANSACTION_DATA: &str = r##"{
  "data": [
    {
      "type": "transactions",
      "id": "demo-txn-01",
      "attributes": {
        "description": "Woolworths",
        "rawText": "WOOLWORTHS 1234 SYDNEY NS AUS",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-23.50", "valueInBaseUnits": -2350 },
        "createdAt": "2025-07-18T17:01:00+10:00",
        "roundUp": { "amount": { "currencyCode": "AUD", "value": "-0.50", "valueInBaseUnits": -50 }, "boostPortion": null }
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [ { "type": "tags", "id": "groceries" } ] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-02",
      "attributes": {
        "description": "Spotify",
        "rawText": "SPOTIFY P/L SYDNEY",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-13.99", "valueInBaseUnits": -1399 },
        "createdAt": "2025-07-18T11:02:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [ { "type": "tags", "id": "subscriptions" } ] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-03",
      "attributes": {
        "description": "Happy Lark Espresso",
        "rawText": "HAPPY LARK ESPRESSO REDFERN",
        "message": null,
        "status": "HELD",
        "amount": { "currencyCode": "AUD", "value": "-4.50", "valueInBaseUnits": -450 },
        "createdAt": "2025-07-18T08:12:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-04",
      "attributes": {
        "description": "Transfer to Savings",
        "rawText": null,
        "message": "Payday sweep",
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-500.00", "valueInBaseUnits": -50000 },
        "createdAt": "2025-07-17T14:30:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-05",
      "attributes": {
        "description": "Transfer from Spending",
        "rawText": null,
        "message": "Payday sweep",
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "500.00", "valueInBaseUnits": 50000 },
        "createdAt": "2025-07-17T14:30:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-savings" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-06",
      "attributes": {
        "description": "Uber Eats",
        "rawText": "UBER *EATS SYDNEY",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-34.20", "valueInBaseUnits": -3420 },
        "createdAt": "2025-07-16T19:45:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [ { "type": "tags", "id": "takeaway" } ] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-07",
      "attributes": {
        "description": "Salary",
        "rawText": "ACME PTY LTD PAYROLL",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "2500.00", "valueInBaseUnits": 250000 },
        "createdAt": "2025-07-16T09:00:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-08",
      "attributes": {
        "description": "JB Hi-Fi",
        "rawText": "JB HI-FI PERTH",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-89.00", "valueInBaseUnits": -8900 },
        "createdAt": "2025-07-15T15:20:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-09",
      "attributes": {
        "description": "Transfer to 🛍️ Maybe Buy",
        "rawText": null,
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-50.00", "valueInBaseUnits": -5000 },
        "createdAt": "2025-07-15T13:00:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-10",
      "attributes": {
        "description": "Transfer from Spending",
        "rawText": null,
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "50.00", "valueInBaseUnits": 5000 },
        "createdAt": "2025-07-15T13:00:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-maybebuy" } },
        "tags": { "data": [] }
      }
    },
    {
      "type": "transactions",
      "id": "demo-txn-11",
      "attributes": {
        "description": "Chemist Warehouse",
        "rawText": "CHEMIST WAREHOUSE NEWTOWN",
        "message": null,
        "status": "SETTLED",
        "amount": { "currencyCode": "AUD", "value": "-12.95", "valueInBaseUnits": -1295 },
        "createdAt": "2025-07-14T10:40:00+10:00",
        "roundUp": null
      },
      "relationships": {
        "account": { "data": { "type": "accounts", "id": "demo-acc-spending" } },
        "tags": { "data": [] }
      }
    }
  ],
  "included": [
    { "type": "accounts", "id": "demo-acc-spending", "attributes": { "displayName": "Spending" } },
    { "type": "accounts", "id": "demo-acc-savings", "attributes": { "displayName": "Savings" } },
    { "type": "accounts", "id": "demo-acc-maybebuy", "attributes": { "displayName": "🛍️ Maybe Buy" } }
  ],
  "links": { "prev": null, "next": null }
}"##;

/// Seed ping response.
const PING_DATA: &str = r##"{
  "meta": { "id": "demo-ping", "statusEmoji": "⚡️" }
}"##;
