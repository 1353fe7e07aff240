//! Defines the `AreaCode` enum for the grid areas served by the ONS load API,
//! together with the category each code belongs to.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three disjoint groups of area codes accepted by the load endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaCategory {
    /// One of the four regional subsystems of the interconnected grid.
    Subsystem,
    /// A state-level geoelectric zone.
    Geoelectric,
    /// An area used for the reporting of transmission losses.
    LossArea,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AreaCodeError {
    #[error("Unknown area code '{0}'")]
    Unknown(String),
}

/// A grid area code as accepted by the `cod_areacarga` query parameter.
///
/// Codes are validated locally: parsing an unrecognized string fails with
/// [`AreaCodeError::Unknown`] instead of being sent to the API.
///
/// # Examples
///
/// ```
/// use ons_carga::{AreaCategory, AreaCode};
///
/// let area: AreaCode = "SECO".parse().unwrap();
/// assert_eq!(area, AreaCode::Seco);
/// assert_eq!(area.category(), AreaCategory::Subsystem);
/// assert_eq!(area.to_string(), "SECO");
///
/// assert!("XX".parse::<AreaCode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaCode {
    // Subsystems
    /// Southeast/Midwest.
    Seco,
    /// South.
    S,
    /// Northeast.
    Ne,
    /// North.
    N,

    // Geoelectric areas
    Rj,
    Sp,
    Mg,
    Es,
    Mt,
    Ms,
    Df,
    Go,
    Ac,
    Ro,
    Pr,
    Sc,
    Rs,
    /// Bahia east.
    Base,
    /// Bahia west.
    Baoe,
    /// Alagoas and Pernambuco.
    Alpe,
    /// Paraíba and Rio Grande do Norte.
    Pbrn,
    Ce,
    Pi,
    /// Tocantins.
    Ton,
    Pa,
    Ma,
    Ap,
    Am,
    Rr,

    // Loss areas
    Pese,
    Pes,
    Pene,
    Pen,
}

impl AreaCode {
    pub const SUBSYSTEMS: [AreaCode; 4] = [AreaCode::Seco, AreaCode::S, AreaCode::Ne, AreaCode::N];

    pub const GEOELECTRIC: [AreaCode; 25] = [
        AreaCode::Rj,
        AreaCode::Sp,
        AreaCode::Mg,
        AreaCode::Es,
        AreaCode::Mt,
        AreaCode::Ms,
        AreaCode::Df,
        AreaCode::Go,
        AreaCode::Ac,
        AreaCode::Ro,
        AreaCode::Pr,
        AreaCode::Sc,
        AreaCode::Rs,
        AreaCode::Base,
        AreaCode::Baoe,
        AreaCode::Alpe,
        AreaCode::Pbrn,
        AreaCode::Ce,
        AreaCode::Pi,
        AreaCode::Ton,
        AreaCode::Pa,
        AreaCode::Ma,
        AreaCode::Ap,
        AreaCode::Am,
        AreaCode::Rr,
    ];

    pub const LOSS_AREAS: [AreaCode; 4] =
        [AreaCode::Pese, AreaCode::Pes, AreaCode::Pene, AreaCode::Pen];

    /// Every known code, subsystems first.
    pub fn all() -> impl Iterator<Item = AreaCode> {
        Self::SUBSYSTEMS
            .into_iter()
            .chain(Self::GEOELECTRIC)
            .chain(Self::LOSS_AREAS)
    }

    /// The four subsystems, used when a request names no area.
    pub fn subsystems() -> Vec<AreaCode> {
        Self::SUBSYSTEMS.to_vec()
    }

    pub fn category(&self) -> AreaCategory {
        match self {
            AreaCode::Seco | AreaCode::S | AreaCode::Ne | AreaCode::N => AreaCategory::Subsystem,
            AreaCode::Pese | AreaCode::Pes | AreaCode::Pene | AreaCode::Pen => {
                AreaCategory::LossArea
            }
            _ => AreaCategory::Geoelectric,
        }
    }

    /// The literal code sent to the API.
    pub fn code(&self) -> &'static str {
        match self {
            AreaCode::Seco => "SECO",
            AreaCode::S => "S",
            AreaCode::Ne => "NE",
            AreaCode::N => "N",
            AreaCode::Rj => "RJ",
            AreaCode::Sp => "SP",
            AreaCode::Mg => "MG",
            AreaCode::Es => "ES",
            AreaCode::Mt => "MT",
            AreaCode::Ms => "MS",
            AreaCode::Df => "DF",
            AreaCode::Go => "GO",
            AreaCode::Ac => "AC",
            AreaCode::Ro => "RO",
            AreaCode::Pr => "PR",
            AreaCode::Sc => "SC",
            AreaCode::Rs => "RS",
            AreaCode::Base => "BASE",
            AreaCode::Baoe => "BAOE",
            AreaCode::Alpe => "ALPE",
            AreaCode::Pbrn => "PBRN",
            AreaCode::Ce => "CE",
            AreaCode::Pi => "PI",
            AreaCode::Ton => "TON",
            AreaCode::Pa => "PA",
            AreaCode::Ma => "MA",
            AreaCode::Ap => "AP",
            AreaCode::Am => "AM",
            AreaCode::Rr => "RR",
            AreaCode::Pese => "PESE",
            AreaCode::Pes => "PES",
            AreaCode::Pene => "PENE",
            AreaCode::Pen => "PEN",
        }
    }
}

impl FromStr for AreaCode {
    type Err = AreaCodeError;

    /// Matches the literal code exactly; codes are upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AreaCode::all()
            .find(|area| area.code() == s)
            .ok_or_else(|| AreaCodeError::Unknown(s.to_string()))
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
