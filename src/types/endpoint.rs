//! Defines the load endpoints exposed by the ONS API and the declared schema of
//! the records each of them returns.

use std::fmt;

pub(crate) const AREA_COLUMN: &str = "cod_areacarga";
pub(crate) const DATE_COLUMN: &str = "dat_referencia";
pub(crate) const INSTANT_UTC_COLUMN: &str = "din_referenciautc";
pub(crate) const INSTANT_COLUMN: &str = "din_referencia";
pub(crate) const UPDATED_COLUMN: &str = "din_atualizacao";
pub(crate) const VERIFIED_COLUMN: &str = "val_cargaglobal";
pub(crate) const SCHEDULED_COLUMN: &str = "val_cargaglobalprogramada";

/// Columns identifying one instant of one area; the merge key of the endpoints.
pub(crate) const JOIN_KEYS: [&str; 3] = [AREA_COLUMN, DATE_COLUMN, INSTANT_COLUMN];

/// Raw response fields the merge cannot work without.
pub(crate) const REQUIRED_RAW_COLUMNS: [&str; 3] = [AREA_COLUMN, DATE_COLUMN, INSTANT_UTC_COLUMN];

/// One of the load series served under the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Load measured on the grid (`val_cargaglobal`).
    Verified,
    /// Load scheduled by the dispatch program (`val_cargaglobalprogramada`).
    Scheduled,
}

/// How a response field is interpreted when building the normalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// ISO-8601 UTC timestamp, converted to local time on ingestion.
    UtcInstant,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// A record without a required field is rejected.
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

const VERIFIED_SCHEMA: [FieldSpec; 5] = [
    FieldSpec::required(AREA_COLUMN, FieldKind::Text),
    FieldSpec::required(DATE_COLUMN, FieldKind::Text),
    FieldSpec::required(INSTANT_UTC_COLUMN, FieldKind::UtcInstant),
    FieldSpec::optional(UPDATED_COLUMN, FieldKind::UtcInstant),
    FieldSpec::optional(VERIFIED_COLUMN, FieldKind::Float),
];

const SCHEDULED_SCHEMA: [FieldSpec; 5] = [
    FieldSpec::required(AREA_COLUMN, FieldKind::Text),
    FieldSpec::required(DATE_COLUMN, FieldKind::Text),
    FieldSpec::required(INSTANT_UTC_COLUMN, FieldKind::UtcInstant),
    FieldSpec::optional(UPDATED_COLUMN, FieldKind::UtcInstant),
    FieldSpec::optional(SCHEDULED_COLUMN, FieldKind::Float),
];

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Verified => "/cargaverificada",
            Endpoint::Scheduled => "/cargaprogramada",
        }
    }

    /// Resolves a configured endpoint path. A missing leading slash is tolerated.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_start_matches('/') {
            "cargaverificada" => Some(Endpoint::Verified),
            "cargaprogramada" => Some(Endpoint::Scheduled),
            _ => None,
        }
    }

    /// The fields a record of this endpoint may carry, in output order.
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            Endpoint::Verified => &VERIFIED_SCHEMA,
            Endpoint::Scheduled => &SCHEDULED_SCHEMA,
        }
    }
}

/// Formats an `Endpoint` using its path.
///
/// ```
/// use ons_carga::Endpoint;
///
/// assert_eq!(Endpoint::Verified.to_string(), "/cargaverificada");
/// ```
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
