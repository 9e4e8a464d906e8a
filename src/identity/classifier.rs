use crate::identity::decoder::DecodedPeerId;
use std::fmt;

/// Peer id prefix of Xunlei (Thunder) clients
pub const XUNLEI_PREFIX: &str = "-XL";

/// Probable client software of a peer, derived from its peer id
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientTag {
    /// Xunlei / Thunder, banned on sight
    Xunlei,
    /// Azureus-style `-XXnnnn-` id, holds the 6-char name+version block
    Azureus(String),
    Unknown,
}

impl ClientTag {
    pub fn as_str(&self) -> &str {
        match self {
            ClientTag::Xunlei => "XL",
            ClientTag::Azureus(tag) => tag,
            ClientTag::Unknown => "UNK",
        }
    }
}

impl fmt::Display for ClientTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers in report lines apply
        f.pad(self.as_str())
    }
}

type Rule = fn(&DecodedPeerId) -> Option<ClientTag>;

/// Classification rules in priority order; the first match wins
pub const RULES: &[(&str, Rule)] = &[
    ("xunlei-prefix", xunlei_prefix),
    ("azureus-style", azureus_style),
];

pub fn xunlei_prefix(id: &DecodedPeerId) -> Option<ClientTag> {
    id.starts_with(XUNLEI_PREFIX).then_some(ClientTag::Xunlei)
}

/// `-` then two name chars then a version digit, e.g. `-qB4690-`
pub fn azureus_style(id: &DecodedPeerId) -> Option<ClientTag> {
    let chars = id.as_chars();
    if chars.len() >= 8 && chars[0] == '-' && chars[3].is_ascii_digit() {
        Some(ClientTag::Azureus(chars[1..7].iter().collect()))
    } else {
        None
    }
}

pub fn classify(id: &DecodedPeerId) -> ClientTag {
    RULES
        .iter()
        .find_map(|(_, rule)| rule(id))
        .unwrap_or(ClientTag::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::decoder::decode;

    #[test]
    fn test_xunlei_prefix() {
        assert_eq!(classify(&decode("-XL0012-abcdefghijkl")), ClientTag::Xunlei);
        assert_eq!(classify(&decode("-XL")), ClientTag::Xunlei);
        assert_eq!(classify(&decode("-XLxxxx%ff%ff")), ClientTag::Xunlei);
        assert_eq!(classify(&decode("%2DXL0000-")), ClientTag::Xunlei);
    }

    #[test]
    fn test_xunlei_takes_priority_over_azureus_shape() {
        // Also matches the azureus shape; must still be tagged XL
        let id = decode("-XL0000-xxxxxxxxxxxx");
        assert!(azureus_style(&id).is_some());
        assert_eq!(classify(&id), ClientTag::Xunlei);
    }

    #[test]
    fn test_azureus_style() {
        assert_eq!(
            classify(&decode("-qB4690-xxxxxxxxxxxx")),
            ClientTag::Azureus("qB4690".to_string())
        );
        assert_eq!(
            classify(&decode("-TR4040-%01%02%03")),
            ClientTag::Azureus("TR4040".to_string())
        );
        assert_eq!(
            classify(&decode("-lt0D80-")),
            ClientTag::Azureus("lt0D80".to_string())
        );
    }

    #[test]
    fn test_azureus_window_may_contain_replacement_chars() {
        let tag = classify(&decode("-UT3%ff%fe-abc"));
        assert_eq!(tag, ClientTag::Azureus("UT3\u{fffd}\u{fffd}-".to_string()));
    }

    #[test]
    fn test_unknown_shapes() {
        // Too short
        assert_eq!(classify(&decode("-qB469")), ClientTag::Unknown);
        // No leading separator
        assert_eq!(classify(&decode("M7-2-2--abcdefghijk")), ClientTag::Unknown);
        // No digit at position 4
        assert_eq!(classify(&decode("-qBx690-abcdef")), ClientTag::Unknown);
        // Lowercase xunlei prefix is not the family prefix
        assert_eq!(classify(&decode("-xlx000-")), ClientTag::Unknown);
        assert_eq!(classify(&decode("")), ClientTag::Unknown);
        assert_eq!(classify(&decode("%ff%ff%ff%ff%ff%ff%ff%ff")), ClientTag::Unknown);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let id = decode("-qB4690-xxxxxxxxxxxx");
        assert_eq!(classify(&id), classify(&id));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(ClientTag::Xunlei.to_string(), "XL");
        assert_eq!(ClientTag::Unknown.to_string(), "UNK");
        assert_eq!(format!("{:6}|", ClientTag::Unknown), "UNK   |");
        assert_eq!(ClientTag::Azureus("qB4690".to_string()).as_str(), "qB4690");
    }

    #[test]
    fn test_rules_order() {
        let names: Vec<&str> = RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["xunlei-prefix", "azureus-style"]);
    }
}
