//! DynamoDB storage backend.
//!
//! Item layout is the credstash-compatible schema: `name` / `version`
//! string keys plus `key`, `contents`, `hmac`, and an optional
//! `created_at`. All reads are strongly consistent and scans follow
//! `last_evaluated_key` pagination.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType, TableStatus as DdbTableStatus,
};
use tracing::trace;

use super::{Storage, TableStatus};
use crate::core::credential::Credential;
use crate::error::{Error, Result};

const ATTR_NAME: &str = "name";
const ATTR_VERSION: &str = "version";
const ATTR_KEY: &str = "key";
const ATTR_CONTENTS: &str = "contents";
const ATTR_HMAC: &str = "hmac";
const ATTR_CREATED_AT: &str = "created_at";

/// DynamoDB-backed credential storage.
///
/// Owns a current-thread tokio runtime so the rest of the crate stays
/// synchronous.
pub struct DynamoStorage {
    client: aws_sdk_dynamodb::Client,
    table: String,
    rt: tokio::runtime::Runtime,
}

impl DynamoStorage {
    /// Connect using the default AWS configuration, optionally overriding
    /// the region.
    pub fn connect(region: Option<String>, table: String) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Store(format!("failed to create runtime: {}", e)))?;

        let client = rt.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(aws_config::Region::new(region));
            }
            let config = loader.load().await;
            aws_sdk_dynamodb::Client::new(&config)
        });

        Ok(Self { client, table, rt })
    }

    /// Scan the table with optional attribute projection, following
    /// pagination until the result set is complete.
    fn scan(&self, projection: Option<&str>) -> Result<Vec<Credential>> {
        self.rt.block_on(async {
            let mut creds = Vec::new();
            let mut start_key = None;

            loop {
                let mut request = self
                    .client
                    .scan()
                    .table_name(&self.table)
                    .consistent_read(true);

                if let Some(expr) = projection {
                    request = request
                        .projection_expression(expr)
                        .expression_attribute_names("#n", ATTR_NAME);
                }
                if let Some(key) = start_key.take() {
                    request = request.set_exclusive_start_key(Some(key));
                }

                let response = request.send().await.map_err(|e| store_err("Scan", e))?;

                for item in response.items() {
                    creds.push(decode_item(item)?);
                }

                match response.last_evaluated_key() {
                    Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                    _ => break,
                }
            }

            Ok(creds)
        })
    }
}

impl Storage for DynamoStorage {
    fn put_if_absent(&self, cred: &Credential) -> Result<()> {
        trace!(name = %cred.name, version = %cred.version, "conditional put");

        self.rt.block_on(async {
            let result = self
                .client
                .put_item()
                .table_name(&self.table)
                .set_item(Some(encode_item(cred)))
                // If the exact (name, version) item exists, the name
                // attribute exists on it and the condition fails.
                .condition_expression("attribute_not_exists(#n)")
                .expression_attribute_names("#n", ATTR_NAME)
                .send()
                .await;

            match result {
                Ok(_) => Ok(()),
                Err(e) if is_conditional_check_failed(&e) => Err(Error::DuplicateVersion {
                    name: cred.name.clone(),
                    version: cred.version.clone(),
                }),
                Err(e) => Err(store_err("PutItem", e)),
            }
        })
    }

    fn get(&self, name: &str, version: &str) -> Result<Option<Credential>> {
        self.rt.block_on(async {
            let response = self
                .client
                .get_item()
                .table_name(&self.table)
                .key(ATTR_NAME, AttributeValue::S(name.to_string()))
                .key(ATTR_VERSION, AttributeValue::S(version.to_string()))
                .consistent_read(true)
                .send()
                .await
                .map_err(|e| store_err("GetItem", e))?;

            response.item.as_ref().map(decode_item).transpose()
        })
    }

    fn query_name(&self, name: &str) -> Result<Vec<Credential>> {
        self.rt.block_on(async {
            let mut creds = Vec::new();
            let mut start_key = None;

            loop {
                let mut request = self
                    .client
                    .query()
                    .table_name(&self.table)
                    .key_condition_expression("#n = :name")
                    .expression_attribute_names("#n", ATTR_NAME)
                    .expression_attribute_values(":name", AttributeValue::S(name.to_string()))
                    .consistent_read(true);

                if let Some(key) = start_key.take() {
                    request = request.set_exclusive_start_key(Some(key));
                }

                let response = request.send().await.map_err(|e| store_err("Query", e))?;

                for item in response.items() {
                    creds.push(decode_item(item)?);
                }

                match response.last_evaluated_key() {
                    Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                    _ => break,
                }
            }

            Ok(creds)
        })
    }

    fn scan_metadata(&self) -> Result<Vec<Credential>> {
        self.scan(Some("#n, version, created_at"))
    }

    fn scan_all(&self) -> Result<Vec<Credential>> {
        self.scan(None)
    }

    fn delete(&self, name: &str, version: &str) -> Result<()> {
        self.rt.block_on(async {
            self.client
                .delete_item()
                .table_name(&self.table)
                .key(ATTR_NAME, AttributeValue::S(name.to_string()))
                .key(ATTR_VERSION, AttributeValue::S(version.to_string()))
                .send()
                .await
                .map_err(|e| store_err("DeleteItem", e))?;
            Ok(())
        })
    }

    fn create_table(&self) -> Result<()> {
        self.rt.block_on(async {
            self.client
                .create_table()
                .table_name(&self.table)
                .attribute_definitions(string_attribute(ATTR_NAME)?)
                .attribute_definitions(string_attribute(ATTR_VERSION)?)
                .key_schema(key_element(ATTR_NAME, KeyType::Hash)?)
                .key_schema(key_element(ATTR_VERSION, KeyType::Range)?)
                .provisioned_throughput(
                    ProvisionedThroughput::builder()
                        .read_capacity_units(1)
                        .write_capacity_units(1)
                        .build()
                        .map_err(|e| Error::Store(e.to_string()))?,
                )
                .send()
                .await
                .map_err(|e| store_err("CreateTable", e))?;
            Ok(())
        })
    }

    fn table_status(&self) -> Result<TableStatus> {
        self.rt.block_on(async {
            let response = self
                .client
                .describe_table()
                .table_name(&self.table)
                .send()
                .await
                .map_err(|e| store_err("DescribeTable", e))?;

            let status = response.table().and_then(|t| t.table_status());
            Ok(match status {
                Some(DdbTableStatus::Active) => TableStatus::Active,
                Some(DdbTableStatus::Creating) => TableStatus::Creating,
                Some(other) => TableStatus::Other(other.as_str().to_string()),
                None => TableStatus::Other("unknown".to_string()),
            })
        })
    }
}

fn string_attribute(name: &str) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| Error::Store(e.to_string()))
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| Error::Store(e.to_string()))
}

fn encode_item(cred: &Credential) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (
            ATTR_NAME.to_string(),
            AttributeValue::S(cred.name.clone()),
        ),
        (
            ATTR_VERSION.to_string(),
            AttributeValue::S(cred.version.clone()),
        ),
        (ATTR_KEY.to_string(), AttributeValue::S(cred.key.clone())),
        (
            ATTR_CONTENTS.to_string(),
            AttributeValue::S(cred.contents.clone()),
        ),
        (ATTR_HMAC.to_string(), AttributeValue::S(cred.hmac.clone())),
    ]);
    if let Some(ts) = cred.created_at {
        item.insert(
            ATTR_CREATED_AT.to_string(),
            AttributeValue::N(ts.to_string()),
        );
    }
    item
}

fn decode_item(item: &HashMap<String, AttributeValue>) -> Result<Credential> {
    let name = string_field(item, ATTR_NAME)
        .ok_or_else(|| Error::Store("item missing name attribute".into()))?;
    let version = string_field(item, ATTR_VERSION)
        .ok_or_else(|| Error::Store("item missing version attribute".into()))?;

    Ok(Credential {
        name,
        version,
        // Absent under metadata projection.
        key: string_field(item, ATTR_KEY).unwrap_or_default(),
        contents: string_field(item, ATTR_CONTENTS).unwrap_or_default(),
        hmac: string_field(item, ATTR_HMAC).unwrap_or_default(),
        created_at: item
            .get(ATTR_CREATED_AT)
            .and_then(|v| v.as_n().ok())
            .and_then(|s| s.parse().ok()),
    })
}

fn string_field(item: &HashMap<String, AttributeValue>, attr: &str) -> Option<String> {
    item.get(attr).and_then(|v| v.as_s().ok()).cloned()
}

fn is_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => matches!(
            service_err.err(),
            PutItemError::ConditionalCheckFailedException(_)
        ),
        _ => false,
    }
}

fn store_err<E>(operation: &str, err: SdkError<E>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::Store(format!(
        "DynamoDB {} failed: {}",
        operation,
        DisplayErrorContext(&err)
    ))
}
