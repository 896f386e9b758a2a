use crate::{ConnectionParameters, StorageResult};

/// Scheme prefix of every compiled connection string
pub const SCHEME: &str = "mongodb://";

/// Compile connection parameters into a MongoDB connection URI.
///
/// Layout: `mongodb://[user[:password]@]server1,server2/database[?k=v&...]`.
/// A password without a user is dropped together with the `@`. Query pairs
/// keep the order they were given in and no segment is percent-encoded.
pub fn make_uri(params: &ConnectionParameters) -> StorageResult<String> {
    params.ensure_valid()?;

    let mut uri = String::from(SCHEME);

    let auth = &params.options.auth;
    if !auth.user.is_empty() {
        uri.push_str(&auth.user);
        if !auth.password.is_empty() {
            uri.push(':');
            uri.push_str(&auth.password);
        }
        uri.push('@');
    }

    uri.push_str(&params.servers.join(","));
    uri.push('/');
    uri.push_str(&params.database);

    let pairs: Vec<String> = params
        .options
        .query_pairs()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !pairs.is_empty() {
        uri.push('?');
        uri.push_str(&pairs.join("&"));
    }

    Ok(uri)
}
