//! DynamoDB-backed generation log

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::{BuildError, DisplayErrorContext},
    types::{
        AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType, TableStatus,
    },
    Client,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::record::{GenerationRecord, ATTR_ID};
use super::RecordStore;
use crate::config::Settings;
use crate::error::StoreError;

/// Table name, capacity and readiness polling for the generation log
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub table_name: String,
    pub read_capacity: i64,
    pub write_capacity: i64,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: "ContentGenerationLog".to_string(),
            read_capacity: 5,
            write_capacity: 5,
            poll_interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

impl StoreConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Set provisioned read/write capacity units
    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.read_capacity = read;
        self.write_capacity = write;
        self
    }

    /// Set how long and how often to wait for the table to become active
    pub fn with_readiness(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts;
        self
    }
}

impl From<&Settings> for StoreConfig {
    fn from(settings: &Settings) -> Self {
        StoreConfig::new(&settings.table_name)
            .with_capacity(settings.read_capacity, settings.write_capacity)
            .with_readiness(
                settings.table_ready_poll_interval(),
                settings.table_ready_max_attempts,
            )
    }
}

/// Observed state of the backing table
#[derive(Debug, Clone, PartialEq, Eq)]
enum TableState {
    Missing,
    Active,
    Pending(String),
}

impl TableState {
    fn from_status(status: Option<&TableStatus>) -> Self {
        match status {
            Some(TableStatus::Active) => TableState::Active,
            Some(other) => TableState::Pending(other.as_str().to_string()),
            None => TableState::Pending("UNKNOWN".to_string()),
        }
    }
}

fn provision_error(err: BuildError) -> StoreError {
    StoreError::Provision(err.to_string())
}

/// Generation log stored in a single DynamoDB table keyed by `id`
pub struct DynamoRecordStore {
    config: StoreConfig,
    client: Client,
}

impl DynamoRecordStore {
    /// Create a new DynamoRecordStore
    pub fn new(config: StoreConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(config, Client::new(sdk_config))
    }

    /// Wrap an already configured DynamoDB client
    pub fn from_client(config: StoreConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn table_state(&self) -> Result<TableState, StoreError> {
        let result = self
            .client
            .describe_table()
            .table_name(&self.config.table_name)
            .send()
            .await;

        match result {
            Ok(output) => Ok(TableState::from_status(
                output.table().and_then(|table| table.table_status()),
            )),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(TableState::Missing)
            }
            Err(err) => Err(StoreError::Provision(DisplayErrorContext(&err).to_string())),
        }
    }

    async fn create_table(&self) -> Result<(), StoreError> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(ATTR_ID)
            .key_type(KeyType::Hash)
            .build()
            .map_err(provision_error)?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(ATTR_ID)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(provision_error)?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(self.config.read_capacity)
            .write_capacity_units(self.config.write_capacity)
            .build()
            .map_err(provision_error)?;

        let result = self
            .client
            .create_table()
            .table_name(&self.config.table_name)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .provisioned_throughput(throughput)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!("Creating table {}", self.config.table_name);
                Ok(())
            }
            // Another instance won the race; its table is as good as ours.
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                info!(
                    "Table {} is already being created elsewhere",
                    self.config.table_name
                );
                Ok(())
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                error!("DynamoDB error: {}", message);
                Err(StoreError::Provision(message))
            }
        }
    }

    async fn wait_until_active(&self) -> Result<(), StoreError> {
        for attempt in 1..=self.config.max_attempts {
            match self.table_state().await? {
                TableState::Active => {
                    info!("Table {} is active", self.config.table_name);
                    return Ok(());
                }
                state => debug!(
                    "Table {} not ready ({:?}), check {}/{}",
                    self.config.table_name, state, attempt, self.config.max_attempts
                ),
            }
            if attempt < self.config.max_attempts {
                sleep(self.config.poll_interval).await;
            }
        }

        Err(StoreError::TableNotReady {
            table: self.config.table_name.clone(),
            attempts: self.config.max_attempts,
        })
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        match self.table_state().await? {
            TableState::Active => {
                info!("Table {} already exists", self.config.table_name);
                return Ok(());
            }
            TableState::Missing => self.create_table().await?,
            TableState::Pending(status) => {
                info!("Table {} exists with status {}", self.config.table_name, status)
            }
        }

        self.wait_until_active().await
    }

    async fn put_record(&self, record: &GenerationRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.config.table_name)
            .set_item(Some(record.to_item()))
            .send()
            .await
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                error!("DynamoDB error: {}", message);
                StoreError::Write(message)
            })?;

        debug!(
            "Wrote record {} ({} characters) to {}",
            record.id, record.content_length, self.config.table_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::record::{ATTR_CONTENT, ATTR_CONTENT_LENGTH, ATTR_TIMESTAMP, ATTR_TOPIC};
    use aws_sdk_dynamodb::operation::create_table::{CreateTableError, CreateTableOutput};
    use aws_sdk_dynamodb::operation::describe_table::{DescribeTableError, DescribeTableOutput};
    use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
    use aws_sdk_dynamodb::types::error::{ResourceInUseException, ResourceNotFoundException};
    use aws_sdk_dynamodb::types::{AttributeValue, TableDescription};
    use aws_smithy_mocks::{mock, mock_client, Rule, RuleMode};

    const TABLE: &str = "TestLog";

    fn store(client: Client, max_attempts: u32) -> DynamoRecordStore {
        let config = StoreConfig::new(TABLE).with_readiness(Duration::ZERO, max_attempts);
        DynamoRecordStore::from_client(config, client)
    }

    fn describe_status(status: TableStatus) -> Rule {
        mock!(Client::describe_table)
            .match_requests(|req| req.table_name() == Some(TABLE))
            .then_output(move || {
                DescribeTableOutput::builder()
                    .table(
                        TableDescription::builder()
                            .table_name(TABLE)
                            .table_status(status.clone())
                            .build(),
                    )
                    .build()
            })
    }

    fn describe_missing() -> Rule {
        mock!(Client::describe_table).then_error(|| {
            DescribeTableError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        })
    }

    #[tokio::test]
    async fn test_ensure_schema_active_table_is_left_alone() {
        let describe = describe_status(TableStatus::Active);
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&describe]);

        store(client, 3).ensure_schema().await.unwrap();

        assert_eq!(describe.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_schema_creates_missing_table() {
        let missing = describe_missing();
        let create = mock!(Client::create_table)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && req.provisioned_throughput().is_some_and(|t| {
                        t.read_capacity_units() == 5 && t.write_capacity_units() == 5
                    })
            })
            .then_output(|| CreateTableOutput::builder().build());
        let active = describe_status(TableStatus::Active);
        let client = mock_client!(
            aws_sdk_dynamodb,
            RuleMode::Sequential,
            [&missing, &create, &active]
        );

        store(client, 3).ensure_schema().await.unwrap();

        assert_eq!(missing.num_calls(), 1);
        assert_eq!(create.num_calls(), 1);
        assert_eq!(active.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_race_counts_as_success() {
        let missing = describe_missing();
        let create = mock!(Client::create_table).then_error(|| {
            CreateTableError::ResourceInUseException(
                ResourceInUseException::builder()
                    .message("Table already exists: TestLog")
                    .build(),
            )
        });
        let creating = describe_status(TableStatus::Creating);
        let active = describe_status(TableStatus::Active);
        let client = mock_client!(
            aws_sdk_dynamodb,
            RuleMode::Sequential,
            [&missing, &create, &creating, &active]
        );

        store(client, 5).ensure_schema().await.unwrap();

        assert_eq!(create.num_calls(), 1);
        assert_eq!(creating.num_calls(), 1);
        assert_eq!(active.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_creating_table_is_polled_until_active() {
        let first = describe_status(TableStatus::Creating);
        let second = describe_status(TableStatus::Creating);
        let third = describe_status(TableStatus::Creating);
        let active = describe_status(TableStatus::Active);
        let client = mock_client!(
            aws_sdk_dynamodb,
            RuleMode::Sequential,
            [&first, &second, &third, &active]
        );

        store(client, 5).ensure_schema().await.unwrap();

        assert_eq!(active.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_polling_gives_up_after_max_attempts() {
        // One check before waiting, then one per attempt.
        let initial = describe_status(TableStatus::Creating);
        let first = describe_status(TableStatus::Creating);
        let second = describe_status(TableStatus::Creating);
        let client = mock_client!(
            aws_sdk_dynamodb,
            RuleMode::Sequential,
            [&initial, &first, &second]
        );

        let result = store(client, 2).ensure_schema().await;

        match result {
            Err(StoreError::TableNotReady { table, attempts }) => {
                assert_eq!(table, TABLE);
                assert_eq!(attempts, 2);
            }
            other => panic!("expected TableNotReady, got {:?}", other),
        }
        assert_eq!(second.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_sleep_after_last_check() {
        let initial = describe_status(TableStatus::Creating);
        let last = describe_status(TableStatus::Creating);
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&initial, &last]);
        let config = StoreConfig::new(TABLE).with_readiness(Duration::from_secs(30), 1);
        let store = DynamoRecordStore::from_client(config, client);

        let result = tokio::time::timeout(Duration::from_secs(5), store.ensure_schema())
            .await
            .expect("gave up without waiting out the poll interval");

        assert!(matches!(result, Err(StoreError::TableNotReady { attempts: 1, .. })));
    }

    #[tokio::test]
    async fn test_put_record_sends_all_attributes() {
        let record = GenerationRecord::new("renewable energy", "Solar is growing.").unwrap();
        let expected = record.clone();
        let put = mock!(Client::put_item)
            .match_requests(move |req| {
                let Some(item) = req.item() else {
                    return false;
                };
                req.table_name() == Some(TABLE)
                    && item.len() == 5
                    && item.get(ATTR_ID) == Some(&AttributeValue::S(expected.id.clone()))
                    && item.get(ATTR_TOPIC)
                        == Some(&AttributeValue::S("renewable energy".to_string()))
                    && item.get(ATTR_CONTENT)
                        == Some(&AttributeValue::S("Solar is growing.".to_string()))
                    && item.get(ATTR_TIMESTAMP)
                        == Some(&AttributeValue::S(expected.timestamp.clone()))
                    && item.get(ATTR_CONTENT_LENGTH) == Some(&AttributeValue::N("17".to_string()))
            })
            .then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&put]);

        store(client, 1).put_record(&record).await.unwrap();

        assert_eq!(put.num_calls(), 1);
    }

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.table_name, "ContentGenerationLog");
        assert_eq!(config.read_capacity, 5);
        assert_eq!(config.write_capacity, 5);
    }

    #[test]
    fn test_store_config_from_settings() {
        let settings = Settings {
            region: "eu-west-1".to_string(),
            model_id: "anthropic.claude-v2".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            table_name: "Posts".to_string(),
            read_capacity: 1,
            write_capacity: 2,
            provision_table: true,
            table_ready_poll_ms: 10,
            table_ready_max_attempts: 3,
        };
        let config = StoreConfig::from(&settings);

        assert_eq!(config.table_name, "Posts");
        assert_eq!(config.read_capacity, 1);
        assert_eq!(config.write_capacity, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_table_state_from_status() {
        assert_eq!(
            TableState::from_status(Some(&TableStatus::Active)),
            TableState::Active
        );
        assert_eq!(
            TableState::from_status(Some(&TableStatus::Creating)),
            TableState::Pending("CREATING".to_string())
        );
        assert!(matches!(TableState::from_status(None), TableState::Pending(_)));
    }
}
