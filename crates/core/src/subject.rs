//! Screening subjects and how a request selects them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Valid screening mode strings.
pub const MODE_PORTFOLIO: &str = "portfolio";
pub const MODE_COMPANIES: &str = "companies";
pub const MODE_SECTOR: &str = "sector";
pub const MODE_REGION: &str = "region";
pub const MODE_ALL: &str = "all";

/// A company that can be screened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Which companies a screening or validation run covers.
///
/// Ad hoc modes carry the requesting client, which owns the resulting
/// subject set; a portfolio is owned by its client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubjectSelector {
    Portfolio {
        portfolio_id: DbId,
    },
    Companies {
        #[serde(default)]
        client_id: Option<DbId>,
        company_ids: Vec<DbId>,
    },
    Sector {
        #[serde(default)]
        client_id: Option<DbId>,
        sector: String,
    },
    Region {
        #[serde(default)]
        client_id: Option<DbId>,
        region: String,
    },
    All {
        #[serde(default)]
        client_id: Option<DbId>,
    },
}

impl SubjectSelector {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Portfolio { .. } => MODE_PORTFOLIO,
            Self::Companies { .. } => MODE_COMPANIES,
            Self::Sector { .. } => MODE_SECTOR,
            Self::Region { .. } => MODE_REGION,
            Self::All { .. } => MODE_ALL,
        }
    }

    /// The client named by an ad hoc selector. Portfolios carry their owner
    /// in storage instead.
    pub fn client_id(&self) -> Option<DbId> {
        match self {
            Self::Portfolio { .. } => None,
            Self::Companies { client_id, .. }
            | Self::Sector { client_id, .. }
            | Self::Region { client_id, .. }
            | Self::All { client_id } => *client_id,
        }
    }
}

/// The resolved companies for a run together with their owning client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSet {
    pub owner_id: Option<DbId>,
    pub subjects: Vec<Company>,
}

impl SubjectSet {
    /// Build a set, keeping only the first occurrence of each company id.
    pub fn new(owner_id: Option<DbId>, companies: Vec<Company>) -> Self {
        let mut seen = HashSet::with_capacity(companies.len());
        let subjects = companies
            .into_iter()
            .filter(|company| seen.insert(company.id))
            .collect();
        Self { owner_id, subjects }
    }

    pub fn company_ids(&self) -> Vec<DbId> {
        self.subjects.iter().map(|c| c.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn company(id: DbId) -> Company {
        Company {
            id,
            name: format!("Company {id}"),
            ticker: None,
            sector: None,
            region: None,
        }
    }

    #[test]
    fn selector_is_tagged_by_mode() {
        let selector: SubjectSelector = serde_json::from_value(json!({
            "mode": "companies",
            "client_id": 4,
            "company_ids": [1, 2]
        }))
        .unwrap();
        assert_eq!(
            selector,
            SubjectSelector::Companies {
                client_id: Some(4),
                company_ids: vec![1, 2],
            }
        );
        assert_eq!(selector.mode(), MODE_COMPANIES);

        let all: SubjectSelector = serde_json::from_value(json!({"mode": "all"})).unwrap();
        assert_eq!(all, SubjectSelector::All { client_id: None });
    }

    #[test]
    fn client_id_comes_from_ad_hoc_modes_only() {
        let sector = SubjectSelector::Sector {
            client_id: Some(7),
            sector: "Energy".into(),
        };
        assert_eq!(sector.client_id(), Some(7));
        assert_eq!(SubjectSelector::All { client_id: None }.client_id(), None);
        assert_eq!(SubjectSelector::Portfolio { portfolio_id: 3 }.client_id(), None);
    }

    #[test]
    fn subject_set_drops_duplicate_companies() {
        let set = SubjectSet::new(Some(1), vec![company(1), company(2), company(1)]);
        assert_eq!(set.company_ids(), vec![1, 2]);
    }

    #[test]
    fn subject_set_keeps_first_occurrence_order_over_large_inputs() {
        let mut companies: Vec<Company> = (1..=5_000).rev().map(company).collect();
        let mut renamed = company(4_999);
        renamed.name = "Duplicate".into();
        companies.push(renamed);
        companies.extend((1..=5_000).map(company));

        let set = SubjectSet::new(None, companies);
        assert_eq!(set.subjects.len(), 5_000);
        assert_eq!(set.subjects[0].id, 5_000);
        assert_eq!(set.subjects[4_999].id, 1);
        assert_eq!(set.subjects[1].name, "Company 4999");
    }
}
