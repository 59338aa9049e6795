//! Display colours for chains

const CHAIN_COLORS: &[(&str, &str)] = &[
    ("Ethereum", "#627EEA"),
    ("Tron", "#FF0013"),
    ("BSC", "#F0B90B"),
    ("Solana", "#9945FF"),
    ("Arbitrum", "#28A0F0"),
    ("Polygon", "#8247E5"),
    ("Avalanche", "#E84142"),
    ("Optimism", "#FF0420"),
    ("Base", "#0052FF"),
    ("Fantom", "#1969FF"),
    ("Gnosis", "#04795B"),
    ("zkSync Era", "#8C8DFC"),
    ("Linea", "#61DFFF"),
    ("Mantle", "#65B3AE"),
    ("Scroll", "#FFEEDA"),
    ("Aptos", "#2ED8A7"),
    ("Sui", "#6FBCF0"),
    ("Near", "#00C08B"),
    ("TON", "#0098EA"),
    ("Hyperliquid", "#00FF00"),
    ("Celo", "#FBCC5C"),
    ("Mode", "#DFFE00"),
    ("Blast", "#FCFC03"),
    ("Manta", "#000000"),
];

/// Colour for a chain, falling back to a stable hue derived from its name
pub fn chain_color(chain: &str) -> String {
    lookup(CHAIN_COLORS, chain).unwrap_or_else(|| hashed_hsl(chain))
}

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| color.to_string())
}

fn hashed_hsl(name: &str) -> String {
    format!("hsl({}, 70%, 50%)", name_hash(name) % 360)
}

/// 31-multiplier string hash over UTF-16 code units, folded to 32 bits
fn name_hash(name: &str) -> u32 {
    let hash = name
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs()
}
