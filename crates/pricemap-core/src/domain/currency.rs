use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of storefront currencies tracked by the harvester.
///
/// The enumeration order is fixed and load-bearing: it is the order regions
/// are harvested in, the column order of the report, and the tie-break order
/// for [`cheapest_currency`](crate::matrix::PriceMatrix::cheapest_currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    USD, // United States
    CAD, // Canada
    UAH, // Ukraine
    TRY, // Turkey
    ARS, // Argentina
    BRL, // Brazil
    AUD, // Australia
    JPY, // Japan
    KRW, // South Korea
    CNY, // China
    PLN, // Poland
    MXN, // Mexico
    INR, // India
    SAR, // Saudi Arabia
    ZAR, // South Africa
    PHP, // Philippines
    VND, // Vietnam
    IDR, // Indonesia
    KZT, // Kazakhstan
    MYR, // Malaysia
    CLP, // Chile
    TWD, // Taiwan
}

impl Currency {
    pub const ALL: [Self; 22] = [
        Self::USD,
        Self::CAD,
        Self::UAH,
        Self::TRY,
        Self::ARS,
        Self::BRL,
        Self::AUD,
        Self::JPY,
        Self::KRW,
        Self::CNY,
        Self::PLN,
        Self::MXN,
        Self::INR,
        Self::SAR,
        Self::ZAR,
        Self::PHP,
        Self::VND,
        Self::IDR,
        Self::KZT,
        Self::MYR,
        Self::CLP,
        Self::TWD,
    ];

    /// The base currency all cached rates are relative to (rate = 1).
    pub const BASE: Self = Self::USD;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::CAD => "CAD",
            Self::UAH => "UAH",
            Self::TRY => "TRY",
            Self::ARS => "ARS",
            Self::BRL => "BRL",
            Self::AUD => "AUD",
            Self::JPY => "JPY",
            Self::KRW => "KRW",
            Self::CNY => "CNY",
            Self::PLN => "PLN",
            Self::MXN => "MXN",
            Self::INR => "INR",
            Self::SAR => "SAR",
            Self::ZAR => "ZAR",
            Self::PHP => "PHP",
            Self::VND => "VND",
            Self::IDR => "IDR",
            Self::KZT => "KZT",
            Self::MYR => "MYR",
            Self::CLP => "CLP",
            Self::TWD => "TWD",
        }
    }

    /// Two-letter region code the storefront uses in its `cc` parameter:
    /// the first two letters of the ISO 4217 code, lowercased.
    pub const fn region_code(self) -> &'static str {
        match self {
            Self::USD => "us",
            Self::CAD => "ca",
            Self::UAH => "ua",
            Self::TRY => "tr",
            Self::ARS => "ar",
            Self::BRL => "br",
            Self::AUD => "au",
            Self::JPY => "jp",
            Self::KRW => "kr",
            Self::CNY => "cn",
            Self::PLN => "pl",
            Self::MXN => "mx",
            Self::INR => "in",
            Self::SAR => "sa",
            Self::ZAR => "za",
            Self::PHP => "ph",
            Self::VND => "vn",
            Self::IDR => "id",
            Self::KZT => "kz",
            Self::MYR => "my",
            Self::CLP => "cl",
            Self::TWD => "tw",
        }
    }

    /// Regions whose storefront pricing is denominated in USD rather than
    /// their nominal local currency. Their table entries carry the USD rate.
    pub const fn priced_in_usd(self) -> bool {
        matches!(self, Self::TRY | Self::ARS)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.as_str() == code)
            .ok_or(ValidationError::UnknownCurrency { value: code })
    }
}
