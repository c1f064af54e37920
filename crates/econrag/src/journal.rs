//! Journal identities and their identifier variants.
//!
//! A journal's works may be registered with Crossref under its print ISSN, its
//! online ISSN, or (for some publishers) only reachable through a DOI prefix.
//! The [`JournalRegistry`] maps every one of those identifiers, and every
//! spelling Crossref uses in `container-title`, back to one canonical name.
//!
//! Registries can be loaded from TOML:
//!
//! ```toml
//! [[journals]]
//! name        = "Journal of Political Economy"
//! print_issn  = "0022-3808"
//! online_issn = "1537-534X"
//! doi_prefix  = "10.1086"
//! ```

use std::fmt;

use super::*;

/// Which ISSN of a journal a request is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierVariant {
  /// The print ISSN
  Print,
  /// The electronic ISSN
  Online,
}

impl IdentifierVariant {
  /// Every variant, in the order the harvester visits them.
  pub const ALL: [IdentifierVariant; 2] = [IdentifierVariant::Print, IdentifierVariant::Online];
}

impl fmt::Display for IdentifierVariant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IdentifierVariant::Print => write!(f, "print"),
      IdentifierVariant::Online => write!(f, "online"),
    }
  }
}

/// A single journal and the identifiers it is known by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
  /// Canonical display name
  pub name:        String,
  /// Print ISSN
  pub print_issn:  String,
  /// Electronic ISSN
  pub online_issn: String,
  /// DOI prefix used to query this journal instead of its ISSN
  #[serde(default)]
  pub doi_prefix:  Option<String>,
  /// Other names Crossref reports for this journal
  #[serde(default)]
  pub aliases:     Vec<String>,
}

impl Journal {
  /// Creates a journal with no DOI prefix and no aliases.
  pub fn new(name: &str, print_issn: &str, online_issn: &str) -> Self {
    Self {
      name:        name.to_string(),
      print_issn:  print_issn.to_string(),
      online_issn: online_issn.to_string(),
      doi_prefix:  None,
      aliases:     Vec::new(),
    }
  }

  /// Sets the DOI prefix.
  pub fn with_doi_prefix(mut self, prefix: &str) -> Self {
    self.doi_prefix = Some(prefix.to_string());
    self
  }

  /// Adds an alternate name.
  pub fn with_alias(mut self, alias: &str) -> Self {
    self.aliases.push(alias.to_string());
    self
  }

  /// The ISSN for the given variant.
  pub fn issn(&self, variant: IdentifierVariant) -> &str {
    match variant {
      IdentifierVariant::Print => &self.print_issn,
      IdentifierVariant::Online => &self.online_issn,
    }
  }
}

/// Static, bidirectional journal lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRegistry {
  /// Registered journals in harvesting order
  journals: Vec<Journal>,
}

impl Default for JournalRegistry {
  /// The five top general-interest economics journals.
  fn default() -> Self {
    Self::new(vec![
      Journal::new("Quarterly Journal of Economics", "0033-5533", "1531-4650")
        .with_alias("The Quarterly Journal of Economics"),
      Journal::new("American Economic Review", "0002-8282", "1944-7981"),
      Journal::new("Journal of Political Economy", "0022-3808", "1537-534X")
        .with_doi_prefix("10.1086"),
      Journal::new("Econometrica", "0012-9682", "1468-0262"),
      Journal::new("Review of Economic Studies", "0034-6527", "1467-937X")
        .with_alias("The Review of Economic Studies"),
    ])
  }
}

impl JournalRegistry {
  /// Creates a registry from a list of journals.
  pub fn new(journals: Vec<Journal>) -> Self { Self { journals } }

  /// Parses a registry from a TOML string with a `[[journals]]` array.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> {
    let registry: Self = toml::from_str(toml_str)?;
    if registry.journals.is_empty() {
      return Err(EconragError::Config("Journal registry is empty".to_string()));
    }
    Ok(registry)
  }

  /// Reads a registry from a TOML file. See [`JournalRegistry::from_toml_str`].
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Iterates over registered journals.
  pub fn journals(&self) -> impl Iterator<Item = &Journal> { self.journals.iter() }

  /// Number of registered journals.
  pub fn len(&self) -> usize { self.journals.len() }

  /// Whether the registry is empty.
  pub fn is_empty(&self) -> bool { self.journals.is_empty() }

  /// Looks up a journal by its canonical name.
  pub fn by_name(&self, name: &str) -> Option<&Journal> {
    self.journals.iter().find(|journal| journal.name == name)
  }

  /// Resolves an ISSN or DOI prefix to the canonical journal name.
  ///
  /// ```
  /// use econrag::journal::JournalRegistry;
  ///
  /// let registry = JournalRegistry::default();
  /// assert_eq!(registry.resolve("1537-534X"), Some("Journal of Political Economy"));
  /// assert_eq!(registry.resolve("10.1086"), Some("Journal of Political Economy"));
  /// assert_eq!(registry.resolve("0000-0000"), None);
  /// ```
  pub fn resolve(&self, identifier: &str) -> Option<&str> {
    self
      .journals
      .iter()
      .find(|journal| {
        journal.print_issn.eq_ignore_ascii_case(identifier)
          || journal.online_issn.eq_ignore_ascii_case(identifier)
          || journal.doi_prefix.as_deref() == Some(identifier)
      })
      .map(|journal| journal.name.as_str())
  }

  /// Maps a reported journal title onto its canonical name, if known.
  ///
  /// Unknown titles are returned unchanged.
  pub fn canonical_name<'a>(&'a self, title: &'a str) -> &'a str {
    self
      .journals
      .iter()
      .find(|journal| journal.name == title || journal.aliases.iter().any(|alias| alias == title))
      .map_or(title, |journal| journal.name.as_str())
  }
}
