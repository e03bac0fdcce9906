use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

/// Upper bound for one connection attempt when the URI does not set its own.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client options for a single bounded attempt. Values from the URI win.
fn bounded_options(options: &ClientOptions) -> ClientOptions {
    let mut options = options.clone();
    options.server_selection_timeout.get_or_insert(ATTEMPT_TIMEOUT);
    options.connect_timeout.get_or_insert(ATTEMPT_TIMEOUT);
    options
}

/// Build a client and ping it once. Callers own the retry policy.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(bounded_options(options))
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|source| MongoDaoError::InitialPing { source })?;
    debug!(database = database_name, "MongoDB ping succeeded");

    Ok((client, database))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_are_bounded_unless_the_uri_says_otherwise() {
        let defaults = bounded_options(&ClientOptions::default());
        assert_eq!(defaults.server_selection_timeout, Some(ATTEMPT_TIMEOUT));
        assert_eq!(defaults.connect_timeout, Some(ATTEMPT_TIMEOUT));

        let mut custom = ClientOptions::default();
        custom.server_selection_timeout = Some(Duration::from_millis(200));
        let custom = bounded_options(&custom);
        assert_eq!(custom.server_selection_timeout, Some(Duration::from_millis(200)));
        assert_eq!(custom.connect_timeout, Some(ATTEMPT_TIMEOUT));
    }
}
