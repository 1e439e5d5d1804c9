//! Server-side export files: customs item manifests, driver handover sheets
//! and ZPL package labels.

use crate::{
    db::DbPool,
    dto::PartialShipmentDetail,
    entities::{partial_shipment, shipment},
    errors::ServiceError,
    services::partial_shipments::load_details,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::{info, instrument};

/// Lets spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const NOT_AVAILABLE: &str = "N/A";

pub const ITEMS_HEADER: [&str; 6] = [
    "PartialShipmentID",
    "Weight",
    "Origin",
    "HS Code",
    "Amount",
    "Value",
];

pub const HANDOVER_HEADER: [&str; 11] = [
    "PartialShipmentID",
    "Receiver Name",
    "Receiver Phone",
    "Receiver Address",
    "Sender Name",
    "Sender Phone",
    "Payment Status",
    "Payment Responsibility",
    "Number of Packages",
    "Total Package Weight",
    "Total Volume",
];

fn csv_error(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::InternalError(format!("Failed to write CSV: {}", err))
}

fn write_csv<I, R>(header: &[&str], rows: I) -> Result<Vec<u8>, ServiceError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record(row.into_iter().collect::<Vec<_>>())
            .map_err(csv_error)?;
    }
    writer.into_inner().map_err(csv_error)
}

fn or_na(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// One row per customs item across all partial shipments.
pub fn render_items_csv(partials: &[PartialShipmentDetail]) -> Result<Vec<u8>, ServiceError> {
    let rows = partials.iter().flat_map(|detail| {
        detail.items.iter().map(move |item| {
            vec![
                detail.partial.id.to_string(),
                item.weight.to_string(),
                item.origin.clone(),
                item.hscode.clone(),
                item.amount.to_string(),
                item.value.to_string(),
            ]
        })
    });
    write_csv(&ITEMS_HEADER, rows)
}

/// One row per partial shipment. Sender columns come from the customer.
pub fn render_handover_csv(partials: &[PartialShipmentDetail]) -> Result<Vec<u8>, ServiceError> {
    let rows = partials.iter().map(|detail| {
        let partial = &detail.partial;
        let customer = detail.customer.as_ref();
        vec![
            partial.id.to_string(),
            or_na(partial.receiver_name.as_deref()),
            or_na(partial.receiver_phone.as_deref()),
            or_na(partial.receiver_address.as_deref()),
            or_na(customer.map(|c| c.name.as_str())),
            or_na(customer.and_then(|c| c.phone.as_deref())),
            partial.payment_status.to_string(),
            partial.payment_responsibility.to_string(),
            detail.packages.len().to_string(),
            detail.total_package_weight().to_string(),
            partial.volume.to_string(),
        ]
    });
    write_csv(&HANDOVER_HEADER, rows)
}

/// Destination code used in custom ids.
pub fn destination_suffix(destination: &str) -> &'static str {
    let destination = destination.to_lowercase();
    if destination.contains("saudia") {
        "ZR"
    } else if destination.contains("syria") {
        "ZA"
    } else {
        "XX"
    }
}

/// Last three digits of the phone number, `000` when there are none.
pub fn phone_suffix(phone: Option<&str>) -> String {
    let digits: Vec<char> = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return "000".to_string();
    }
    digits[digits.len().saturating_sub(3)..].iter().collect()
}

/// ZPL for every package of a partial shipment, one `^XA..^XZ` block each.
pub fn render_labels(shipment: &shipment::Model, detail: &PartialShipmentDetail) -> String {
    let customer = detail.customer.as_ref();
    let suffix = destination_suffix(&shipment.destination);
    let last_digits = phone_suffix(customer.and_then(|c| c.phone.as_deref()));
    let initial: String = customer
        .and_then(|c| c.name.trim().chars().next())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    let total = detail.packages.len();

    (1..=total)
        .map(|n| {
            let custom_id = format!("{}{}{}{}/{}", shipment.id, suffix, last_digits, n, total);
            format!(
                "^XA\n\
                 ^FO50,50^A0N,30,30^FDCustom ID: {custom_id}^FS\n\
                 ^FO50,100^A0N,30,30^FDPartial Shipment: {pid} - {initial}^FS\n\
                 ^FO50,150^A0N,30,30^FDPackage: {n}/{total}^FS\n\
                 ^XZ",
                pid = detail.partial.id,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
pub struct ExportService {
    db_pool: Arc<DbPool>,
}

impl ExportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn closed_shipment_details(
        &self,
        shipment_id: i32,
    ) -> Result<Vec<PartialShipmentDetail>, ServiceError> {
        let db = &*self.db_pool;
        let shipment = shipment::Entity::find_by_id(shipment_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))?;
        if shipment.is_open {
            return Err(ServiceError::Conflict(format!(
                "Shipment {} must be closed before exporting",
                shipment_id
            )));
        }

        let partials = partial_shipment::Entity::find()
            .filter(partial_shipment::Column::ShipmentId.eq(shipment_id))
            .order_by_asc(partial_shipment::Column::Id)
            .all(db)
            .await?;
        Ok(load_details(db, partials, true).await?)
    }

    #[instrument(skip(self))]
    pub async fn items_csv(&self, shipment_id: i32) -> Result<Vec<u8>, ServiceError> {
        let partials = self.closed_shipment_details(shipment_id).await?;
        if partials.iter().all(|p| p.items.is_empty()) {
            return Err(ServiceError::NotFound(
                "No items found for this shipment".to_string(),
            ));
        }
        let body = render_items_csv(&partials)?;
        info!(shipment_id, bytes = body.len(), "Items manifest exported");
        Ok(body)
    }

    #[instrument(skip(self))]
    pub async fn handover_csv(&self, shipment_id: i32) -> Result<Vec<u8>, ServiceError> {
        let partials = self.closed_shipment_details(shipment_id).await?;
        let body = render_handover_csv(&partials)?;
        info!(shipment_id, rows = partials.len(), "Handover sheet exported");
        Ok(body)
    }

    #[instrument(skip(self))]
    pub async fn labels(
        &self,
        shipment_id: i32,
        partial_shipment_id: i32,
    ) -> Result<String, ServiceError> {
        let db = &*self.db_pool;
        let shipment = shipment::Entity::find_by_id(shipment_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))?;
        let partial = partial_shipment::Entity::find_by_id(partial_shipment_id)
            .filter(partial_shipment::Column::ShipmentId.eq(shipment_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Partial shipment"))?;

        let detail = load_details(db, vec![partial], true)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Partial shipment"))?;
        if detail.packages.is_empty() {
            return Err(ServiceError::BadRequest(
                "Partial shipment has no packages to label".to_string(),
            ));
        }

        Ok(render_labels(&shipment, &detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{customer, item, package, PaymentResponsibility, PaymentStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn shipment(destination: &str) -> shipment::Model {
        shipment::Model {
            id: 7,
            destination: destination.to_string(),
            date_created: Utc::now(),
            is_open: false,
            total_weight: 8.0,
            total_volume: 3.0,
            driver_name: Some("Samir".into()),
            driver_vehicle: Some("Truck".into()),
            date_closed: Some(Utc::now()),
            note: None,
        }
    }

    fn detail(phone: Option<&str>, packages: usize) -> PartialShipmentDetail {
        PartialShipmentDetail {
            partial: partial_shipment::Model {
                id: 12,
                shipment_id: 7,
                customer_id: 1,
                receiver_name: Some("Hadi".into()),
                receiver_phone: None,
                receiver_address: Some("Damascus, \"Old City\"".into()),
                volume: 3.0,
                cost: dec!(100),
                amount_paid: dec!(40),
                payment_status: PaymentStatus::PartiallyPaid,
                payment_responsibility: PaymentResponsibility::Customer,
                is_paid: false,
                created_at: Utc::now(),
            },
            packages: (0..packages)
                .map(|i| package::Model {
                    id: i as i32 + 1,
                    partial_shipment_id: 12,
                    length: 1.0,
                    width: 1.0,
                    height: 1.0,
                    weight: 2.5,
                })
                .collect(),
            items: vec![item::Model {
                id: 1,
                partial_shipment_id: 12,
                weight: 5.0,
                origin: "DE".into(),
                hscode: "8471.30".into(),
                amount: 2.0,
                value: dec!(250.00),
            }],
            customer: Some(customer::Model {
                id: 1,
                name: "rami".into(),
                phone: phone.map(String::from),
                address: "Frankfurt".into(),
                balance: dec!(60),
                created_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn suffix_follows_destination_case_insensitively() {
        assert_eq!(destination_suffix("Saudia Arabia"), "ZR");
        assert_eq!(destination_suffix("SYRIA - Aleppo"), "ZA");
        assert_eq!(destination_suffix("Lebanon"), "XX");
    }

    #[test]
    fn phone_suffix_takes_last_three_digits() {
        assert_eq!(phone_suffix(Some("+49 170 555-0123")), "123");
        assert_eq!(phone_suffix(None), "000");
        assert_eq!(phone_suffix(Some("")), "000");
    }

    #[test]
    fn labels_number_each_package() {
        let zpl = render_labels(&shipment("Syria"), &detail(Some("0944 000 321"), 2));
        let expected_first = "^XA\n\
            ^FO50,50^A0N,30,30^FDCustom ID: 7ZA3211/2^FS\n\
            ^FO50,100^A0N,30,30^FDPartial Shipment: 12 - R^FS\n\
            ^FO50,150^A0N,30,30^FDPackage: 1/2^FS\n\
            ^XZ";
        assert!(zpl.starts_with(expected_first));
        assert!(zpl.contains("Custom ID: 7ZA3212/2"));
        assert_eq!(zpl.matches("^XA").count(), 2);
    }

    #[test]
    fn items_csv_starts_with_bom_and_header() {
        let body = render_items_csv(&[detail(None, 1)]).unwrap();
        assert!(body.starts_with(UTF8_BOM));
        let text = String::from_utf8(body[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("PartialShipmentID,Weight,Origin,HS Code,Amount,Value")
        );
        assert_eq!(lines.next(), Some("12,5,DE,8471.30,2,250.00"));
    }

    #[test]
    fn handover_csv_fills_missing_values() {
        let body = render_handover_csv(&[detail(None, 2)]).unwrap();
        let text = String::from_utf8(body[UTF8_BOM.len()..].to_vec()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "12,Hadi,N/A,\"Damascus, \"\"Old City\"\"\",rami,N/A,partially_paid,customer,2,5,3"
        );
    }
}
