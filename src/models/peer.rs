use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An active download as reported by `aria2.tellActive`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    /// aria2 download GID
    pub gid: String,
}

/// One peer of a transfer as reported by `aria2.getPeers`
///
/// aria2 reports numbers and booleans as strings; parsing is lenient and
/// falls back to zero / `false` / `""` instead of failing the whole peer list.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PeerObservation {
    /// Peer network address, kept opaque
    #[serde(rename = "ip", default, deserialize_with = "lenient_string")]
    pub address: String,
    /// Percent-encoded raw peer id bytes
    #[serde(rename = "peerId", default, deserialize_with = "lenient_string")]
    pub raw_identifier: String,
    /// Bytes/second we download from this peer
    #[serde(rename = "downloadSpeed", default, deserialize_with = "lenient_u64")]
    pub download_speed: u64,
    /// Bytes/second we upload to this peer
    #[serde(rename = "uploadSpeed", default, deserialize_with = "lenient_u64")]
    pub upload_speed: u64,
    #[serde(rename = "seeder", default, deserialize_with = "lenient_bool")]
    pub is_seeder: bool,
}

fn value_to_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value))
}

/// Null or non-string values become an empty string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s == "true",
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_aria2_peer() {
        let raw = json!({
            "peerId": "-qB4690-%a1%b2cdefghijkl",
            "ip": "203.0.113.7",
            "port": "51413",
            "bitfield": "ffff",
            "amChoking": "true",
            "peerChoking": "false",
            "downloadSpeed": "100000",
            "uploadSpeed": "1000",
            "seeder": "false"
        });

        let peer: PeerObservation = serde_json::from_value(raw).unwrap();
        assert_eq!(peer.address, "203.0.113.7");
        assert_eq!(peer.raw_identifier, "-qB4690-%a1%b2cdefghijkl");
        assert_eq!(peer.download_speed, 100_000);
        assert_eq!(peer.upload_speed, 1000);
        assert!(!peer.is_seeder);
    }

    #[test]
    fn test_parse_native_types() {
        let raw = json!({
            "ip": "10.0.0.1",
            "downloadSpeed": 2048,
            "uploadSpeed": 0,
            "seeder": true
        });

        let peer: PeerObservation = serde_json::from_value(raw).unwrap();
        assert_eq!(peer.download_speed, 2048);
        assert_eq!(peer.upload_speed, 0);
        assert!(peer.is_seeder);
    }

    #[test]
    fn test_unparsable_speeds_default_to_zero() {
        let raw = json!({
            "ip": "10.0.0.1",
            "downloadSpeed": "fast",
            "uploadSpeed": -5,
            "seeder": "yes"
        });

        let peer: PeerObservation = serde_json::from_value(raw).unwrap();
        assert_eq!(peer.download_speed, 0);
        assert_eq!(peer.upload_speed, 0);
        assert!(!peer.is_seeder);
    }

    #[test]
    fn test_missing_fields_default() {
        let peer: PeerObservation = serde_json::from_value(json!({})).unwrap();
        assert_eq!(peer, PeerObservation::default());
    }

    #[test]
    fn test_null_strings_keep_rest_of_list() {
        let raw = json!([
            {"ip": "1.2.3.4", "peerId": null, "downloadSpeed": "0", "uploadSpeed": "0", "seeder": "false"},
            {"ip": "5.6.7.8", "peerId": "-XL0000-", "downloadSpeed": "0", "uploadSpeed": "0", "seeder": "false"},
            {"ip": null, "peerId": 42, "downloadSpeed": null, "uploadSpeed": null, "seeder": null}
        ]);

        let peers: Vec<PeerObservation> = serde_json::from_value(raw).unwrap();
        assert_eq!(peers.len(), 3);
        assert_eq!(peers[0].address, "1.2.3.4");
        assert_eq!(peers[0].raw_identifier, "");
        assert_eq!(peers[1].address, "5.6.7.8");
        assert_eq!(peers[1].raw_identifier, "-XL0000-");
        assert_eq!(peers[2], PeerObservation::default());
    }

    #[test]
    fn test_parse_transfer() {
        let transfer: Transfer =
            serde_json::from_value(json!({"gid": "2089b05ecca3d829", "status": "active"})).unwrap();
        assert_eq!(transfer.gid, "2089b05ecca3d829");
    }
}
