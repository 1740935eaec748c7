//! Report queries

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::Database;
use crate::model::QueryCategory;
use crate::schema::TABLES;

/// Reports that read ingested tables
pub const INGESTED_REPORTS: [&str; 4] = ["transactions", "rgu", "sellin", "tertiary"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCount {
    pub entity: String,
    pub active: i64,
    pub deleted: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRetailerCount {
    pub partner_code: String,
    pub partner_name: String,
    pub retailers: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub sites: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub entities: Vec<EntityCount>,
    pub retailers_per_partner: Vec<PartnerRetailerCount>,
    pub sites_per_status: Vec<StatusCount>,
}

/// A report with no data source behind it yet
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularReport {
    pub report: String,
    pub available: bool,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Value>,
}

fn int(row: &serde_json::Value, key: &str) -> i64 {
    match row.get(key) {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or_default(),
        Some(serde_json::Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn text(row: &serde_json::Value, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Active and soft-deleted row counts per table. Retailers have no soft-delete state.
pub async fn entity_counts(db: &Database) -> anyhow::Result<Vec<EntityCount>> {
    let mut counts = Vec::with_capacity(TABLES.len());

    for table in TABLES {
        let sql = if table == "retailer" {
            "SELECT COUNT(*) AS active, 0 AS deleted FROM retailer".to_string()
        } else {
            format!(
                "SELECT COALESCE(SUM(CASE WHEN is_deleted THEN 0 ELSE 1 END), 0) AS active, \
                 COALESCE(SUM(CASE WHEN is_deleted THEN 1 ELSE 0 END), 0) AS deleted FROM {table}"
            )
        };

        let rows = db.query(&sql, vec![], QueryCategory::Dashboard).await?;
        let row = rows.first().cloned().unwrap_or_default();
        counts.push(EntityCount {
            entity: table.to_string(),
            active: int(&row, "active"),
            deleted: int(&row, "deleted"),
        });
    }

    Ok(counts)
}

pub async fn retailers_per_partner(db: &Database) -> anyhow::Result<Vec<PartnerRetailerCount>> {
    let rows = db
        .query(
            "SELECT p.partner_code AS partner_code, p.partner_name AS partner_name, \
             COUNT(r.organization_id) AS retailers \
             FROM partner p LEFT JOIN retailer r ON r.partner_code = p.partner_code \
             WHERE p.is_deleted = 0 \
             GROUP BY p.partner_code, p.partner_name \
             ORDER BY retailers DESC, p.partner_code",
            vec![],
            QueryCategory::Reports,
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| PartnerRetailerCount {
            partner_code: text(row, "partner_code"),
            partner_name: text(row, "partner_name"),
            retailers: int(row, "retailers"),
        })
        .collect())
}

pub async fn sites_per_status(db: &Database) -> anyhow::Result<Vec<StatusCount>> {
    let rows = db
        .query(
            "SELECT status, COUNT(*) AS sites FROM site WHERE is_deleted = 0 \
             GROUP BY status ORDER BY status",
            vec![],
            QueryCategory::Reports,
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| StatusCount {
            status: text(row, "status"),
            sites: int(row, "sites"),
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn dashboard(db: &Database) -> anyhow::Result<DashboardSummary> {
    Ok(DashboardSummary {
        entities: entity_counts(db).await?,
        retailers_per_partner: retailers_per_partner(db).await?,
        sites_per_status: sites_per_status(db).await?,
    })
}

/// Reports over ingested data answer with an empty dataset until ingestion persists rows
pub fn ingested(report: &str) -> Option<TabularReport> {
    INGESTED_REPORTS
        .contains(&report)
        .then(|| TabularReport {
            report: report.to_string(),
            available: false,
            columns: Vec::new(),
            rows: Vec::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{partner, retailer, site};
    use crate::service::retailer::RetailerForm;
    use crate::service::site::SiteUpdate;
    use crate::service::{self, tests::partner_form, tests::site_form};

    fn count<'a>(counts: &'a [EntityCount], entity: &str) -> &'a EntityCount {
        counts
            .iter()
            .find(|c| c.entity == entity)
            .unwrap_or_else(|| panic!("missing {entity}"))
    }

    #[tokio::test]
    async fn test_dashboard_on_empty_database() {
        let db = Database::connect_in_memory().await.unwrap();

        let summary = dashboard(&db).await.unwrap();
        assert_eq!(summary.entities.len(), TABLES.len());
        assert!(summary.entities.iter().all(|c| c.active == 0 && c.deleted == 0));
        assert!(summary.retailers_per_partner.is_empty());
        assert!(summary.sites_per_status.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let db = Database::connect_in_memory().await.unwrap();
        service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap();
        service::create::<partner::Entity>(&db, partner_form("P002"))
            .await
            .unwrap();
        service::create::<site::Entity>(&db, site_form("S001"))
            .await
            .unwrap();
        service::create::<site::Entity>(&db, site_form("S002"))
            .await
            .unwrap();
        service::update::<site::Entity>(
            &db,
            "S002",
            SiteUpdate {
                status: Some("maintenance".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        service::create::<retailer::Entity>(
            &db,
            RetailerForm {
                organization_id: "R001".to_string(),
                organization_name: "Outlet".to_string(),
                outlet_type: "kiosk".to_string(),
                partner_code: "P001".to_string(),
                site_id: "S001".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        service::delete_soft::<partner::Entity>(&db, "P002")
            .await
            .unwrap();

        let summary = dashboard(&db).await.unwrap();

        let partners = count(&summary.entities, "partner");
        assert_eq!((partners.active, partners.deleted), (1, 1));
        assert_eq!(count(&summary.entities, "retailer").active, 1);
        assert_eq!(count(&summary.entities, "site").active, 2);

        assert_eq!(summary.retailers_per_partner.len(), 1);
        assert_eq!(summary.retailers_per_partner[0].partner_code, "P001");
        assert_eq!(summary.retailers_per_partner[0].retailers, 1);

        let statuses: Vec<(&str, i64)> = summary
            .sites_per_status
            .iter()
            .map(|s| (s.status.as_str(), s.sites))
            .collect();
        assert_eq!(statuses, vec![("active", 1), ("maintenance", 1)]);
    }

    #[test]
    fn test_ingested_reports_are_unavailable() {
        let report = ingested("rgu").unwrap();
        assert!(!report.available);
        assert!(report.rows.is_empty());

        assert!(ingested("dashboard").is_none());
    }
}
