//! Utility functions.

use crate::QueryMetadata;

/// The length every queried name is padded towards, i.e. the longest possible domain name in
/// presentation format.
pub const PADDED_NAME_LEN: usize = 253;

/// The character the `random_padding` parameter is made of.
pub const PADDING_CHAR: char = '0';

/// Returns how many padding characters to send along with a query for `host`.
///
/// Names that are already [`PADDED_NAME_LEN`] bytes or longer get no padding; they are neither
/// truncated nor rejected.
pub fn padding_len(host: &str) -> usize {
    PADDED_NAME_LEN.saturating_sub(host.len())
}

/// Builds the query string parameters for `metadata`, in the order they are sent.
///
/// The padding hides the length of the queried name from anyone who can only observe the size of
/// the request.
pub fn prepare_query(metadata: &QueryMetadata) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(4);
    params.push(("name", metadata.name.clone()));
    params.push(("type", metadata.qtype.clone()));
    // an empty subnet lets the resolver use the client's own address
    if !metadata.edns_subnet.is_empty() {
        params.push(("edns_client_subnet", metadata.edns_subnet.clone()));
    }
    let padding = PADDING_CHAR.to_string().repeat(padding_len(&metadata.name));
    params.push(("random_padding", padding));
    params
}

#[cfg(test)]
mod tests {
    use super::{padding_len, prepare_query, PADDED_NAME_LEN};
    use crate::QueryMetadata;

    fn metadata(name: &str, edns_subnet: &str) -> QueryMetadata {
        QueryMetadata {
            name: name.into(),
            qtype: "A".into(),
            edns_subnet: edns_subnet.into(),
        }
    }

    #[test]
    fn padding_towards_max_name_len() {
        assert_eq!(padding_len(""), PADDED_NAME_LEN);
        assert_eq!(padding_len("example.com"), 253 - 11);
        assert_eq!(padding_len(&"a".repeat(252)), 1);
        assert_eq!(padding_len(&"a".repeat(253)), 0);
        assert_eq!(padding_len(&"a".repeat(300)), 0);
    }

    #[test]
    fn padding_counts_bytes() {
        // "bücher.de" is nine characters but ten bytes
        assert_eq!(padding_len("bücher.de"), 253 - 10);
    }

    #[test]
    fn params_with_subnet() {
        let params = prepare_query(&metadata("example.com", "1.2.3.0/24"));
        let keys: Vec<_> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["name", "type", "edns_client_subnet", "random_padding"]);
        assert_eq!(params[0].1, "example.com");
        assert_eq!(params[1].1, "A");
        assert_eq!(params[2].1, "1.2.3.0/24");
        assert_eq!(params[3].1.len(), 242);
        assert!(params[3].1.chars().all(|c| c == '0'));
    }

    #[test]
    fn params_without_subnet() {
        let params = prepare_query(&metadata("example.com", ""));
        assert!(params.iter().all(|(k, _)| *k != "edns_client_subnet"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn params_for_overlong_name() {
        let name = "a".repeat(260);
        let params = prepare_query(&metadata(&name, "0.0.0.0/0"));
        assert_eq!(params[0].1, name);
        assert_eq!(params[3], ("random_padding", String::new()));
    }
}
