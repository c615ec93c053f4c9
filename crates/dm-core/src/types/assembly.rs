//! Assembly metadata types.
//!
//! Both the compiled-binary reader and the `AssemblyInfo.cs` reader produce an
//! [`AssemblyMetadata`]: a version plus whichever descriptive attributes the
//! assembly declares, keyed by the names in [`attribute_field`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maps an assembly-level attribute type name to its output field.
///
/// Accepts simple names (`AssemblyTitle`), names with the `Attribute` suffix,
/// and namespace-qualified names. Returns `None` for attributes that are not
/// reported.
///
/// # Examples
///
/// ```
/// use dm_core::attribute_field;
///
/// assert_eq!(attribute_field("AssemblyTitle"), Some("name"));
/// assert_eq!(attribute_field("System.Reflection.AssemblyCompanyAttribute"), Some("company"));
/// assert_eq!(attribute_field("System.Runtime.InteropServices.Guid"), Some("guid"));
/// assert_eq!(attribute_field("ComVisible"), None);
/// ```
#[must_use]
pub fn attribute_field(type_name: &str) -> Option<&'static str> {
    let simple = type_name.rsplit('.').next().unwrap_or(type_name);
    let simple = simple.strip_suffix("Attribute").unwrap_or(simple);

    let field = match simple {
        "AssemblyTitle" => "name",
        "AssemblyDescription" => "description",
        "AssemblyConfiguration" => "configuration",
        "AssemblyCompany" => "company",
        "AssemblyProduct" => "product",
        "AssemblyCopyright" => "copyright",
        "AssemblyTrademark" => "trademark",
        "AssemblyFileVersion" => "file_version",
        "AssemblyVersion" => "assembly_version",
        "Guid" => "guid",
        _ => return None,
    };
    Some(field)
}

/// A four-part assembly version.
///
/// # Examples
///
/// ```
/// use dm_core::AssemblyVersion;
///
/// let version: AssemblyVersion = "1.2.*".parse().unwrap();
/// assert_eq!(version.to_string(), "1.2.0.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AssemblyVersion {
    /// Major component.
    pub major: u16,
    /// Minor component.
    pub minor: u16,
    /// Build component.
    pub build: u16,
    /// Revision component.
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its four components.
    #[inline]
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for AssemblyVersion {
    type Err = String;

    /// Parses up to four dot-separated components.
    ///
    /// Missing components and `*` wildcards become 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty version".to_owned());
        }

        let mut parts = [0_u16; 4];
        for (index, part) in s.split('.').enumerate() {
            let Some(slot) = parts.get_mut(index) else {
                return Err(format!("too many version components in '{s}'"));
            };
            let part = part.trim();
            if part == "*" {
                continue;
            }
            *slot = part
                .parse()
                .map_err(|_| format!("invalid version component '{part}' in '{s}'"))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl From<AssemblyVersion> for String {
    fn from(version: AssemblyVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for AssemblyVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Metadata describing one assembly.
///
/// Serializes as a flat object: `version` followed by the discovered
/// attributes in key order. Absent attributes are simply missing.
///
/// # Examples
///
/// ```
/// use dm_core::{AssemblyMetadata, AssemblyVersion};
///
/// let mut metadata = AssemblyMetadata::new(AssemblyVersion::new(1, 0, 0, 0));
/// metadata.record("AssemblyTitleAttribute", "Widgets");
/// metadata.record("AssemblyTrademark", "   ");
///
/// let json = serde_json::to_string(&metadata)?;
/// assert_eq!(json, r#"{"version":"1.0.0.0","name":"Widgets"}"#);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// The assembly's identity version.
    pub version: AssemblyVersion,

    /// Descriptive attributes keyed by output field name.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl AssemblyMetadata {
    /// Creates metadata with no attributes.
    #[must_use]
    pub fn new(version: AssemblyVersion) -> Self {
        Self {
            version,
            attributes: BTreeMap::new(),
        }
    }

    /// Records an attribute value if the attribute type is reported.
    ///
    /// Blank values are ignored, and the first value recorded for a field wins.
    /// Returns `true` if the value was stored.
    pub fn record(&mut self, attribute_type: &str, value: &str) -> bool {
        let Some(field) = attribute_field(attribute_type) else {
            return false;
        };
        if value.trim().is_empty() || self.attributes.contains_key(field) {
            return false;
        }
        self.attributes.insert(field.to_owned(), value.to_owned());
        true
    }

    /// Returns the value recorded for an output field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }
}
