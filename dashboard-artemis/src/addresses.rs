//! Known non-payment addresses (Ethereum mainnet)
//!
//! Transfers touching these addresses are exchange, DEX routing or bridge
//! activity rather than payments. Addresses are stored in checksum case;
//! every lookup is case-insensitive.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Address categories excluded from adjusted volume
pub const EXCLUDED_CATEGORIES: &[&str] = &["cex", "dex", "bridge", "lending", "mev", "mixer"];

/// Entity name and its known addresses
pub type AddressTable = &'static [(&'static str, &'static [&'static str])];

/// Centralized exchange hot wallets
pub const CEX_ADDRESSES: AddressTable = &[
    (
        "binance",
        &[
            "0x28C6c06298d514Db089934071355E5743bf21d60",
            "0x21a31Ee1afC51d94C2eFcCAa2092aD1028285549",
            "0xDFd5293D8e347dFe59E90eFd55b2956a1343963d",
            "0x56Eddb7aa87536c09CCc2793473599fD21A8b17F",
            "0xF977814e90dA44bFA03b6295A0616a897441aceC",
        ],
    ),
    (
        "coinbase",
        &[
            "0x71660c4005BA85c37ccec55d0C4493E66Fe775d3",
            "0x503828976D22510aad0201ac7EC88293211D23Da",
            "0xddfAbCdc4D8FfC6d5beaf154f18B778f892A0740",
            "0x3cD751E6b0078Be393132286c442345e5DC49699",
            "0xA9D1e08C7793af67e9d92fe308d5697FB81d3E43",
        ],
    ),
    (
        "kraken",
        &[
            "0x2910543Af39abA0Cd09dBb2D50200b3E800A63D2",
            "0x0A869d79a7052C7f1b55a8EbAbbEa3420F0D1E13",
            "0xE853c56864A2ebe4576a807D26Fdc4A0adA51919",
        ],
    ),
    (
        "okx",
        &[
            "0x6cC5F688a315f3dC28A7781717a9A798a59fDA7b",
            "0x236F9F97e0E62388479bf9E5BA4889e46B0273C3",
        ],
    ),
    ("bybit", &["0xf89d7b9c864f589bbF53a82105107622B35EaA40"]),
];

/// DEX routers
pub const DEX_ADDRESSES: AddressTable = &[
    (
        "uniswap",
        &[
            "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D",
            "0xE592427A0AEce92De3Edee1F18E0157C05861564",
            "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45",
            "0x3fC91A3afd70395Cd496C647d5a6CC9D4B2b7FAD",
        ],
    ),
    ("sushiswap", &["0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F"]),
    ("curve", &["0x99a58482BD75cbab83b27EC03CA68fF489b5788f"]),
    (
        "1inch",
        &[
            "0x1111111254fb6c44bAC0beD2854e76F90643097d",
            "0x1111111254EEB25477B68fb85Ed929f73A960582",
        ],
    ),
];

/// Bridge contracts
pub const BRIDGE_ADDRESSES: AddressTable = &[
    ("stargate", &["0x8731d54E9D02c286767d56ac03e8037C07e01e98"]),
    ("hop", &["0xb8901acB165ed027E32754E0FFe830802919727f"]),
    ("across", &["0x4D9079Bb4165aeb4084c526a32695dCfd2F77381"]),
];

/// Category of a known address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressCategory {
    Cex,
    Dex,
    Bridge,
}

impl AddressCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressCategory::Cex => "cex",
            AddressCategory::Dex => "dex",
            AddressCategory::Bridge => "bridge",
        }
    }

    fn table(&self) -> AddressTable {
        match self {
            AddressCategory::Cex => CEX_ADDRESSES,
            AddressCategory::Dex => DEX_ADDRESSES,
            AddressCategory::Bridge => BRIDGE_ADDRESSES,
        }
    }
}

impl fmt::Display for AddressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const CATEGORIES: [AddressCategory; 3] = [
    AddressCategory::Cex,
    AddressCategory::Dex,
    AddressCategory::Bridge,
];

/// Lower-cased union of every known exchange, DEX and bridge address
pub fn excluded_addresses() -> HashSet<String> {
    CATEGORIES
        .iter()
        .flat_map(|category| category.table().iter())
        .flat_map(|(_, addresses)| addresses.iter())
        .map(|address| address.to_lowercase())
        .collect()
}

/// Category and entity of a known address
pub fn classify_address(address: &str) -> Option<(AddressCategory, &'static str)> {
    CATEGORIES.iter().find_map(|category| {
        category
            .table()
            .iter()
            .find(|(_, addresses)| addresses.iter().any(|a| a.eq_ignore_ascii_case(address)))
            .map(|(entity, _)| (*category, *entity))
    })
}
