use crate::{
    commands::Command,
    common::{
        clean_optional, require_non_negative, require_non_negative_decimal, require_positive,
        NumericInput,
    },
    db::{DatabaseAccess, DbPool},
    dto::PartialShipmentDetail,
    entities::{
        customer, item, package, partial_shipment, shipment, PaymentResponsibility, PaymentStatus,
    },
    errors::ServiceError,
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

const MISSING_PACKAGES: &str = "At least one package detail must be provided.";
const MISSING_ITEMS: &str = "At least one shipment item must be provided.";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    pub length: NumericInput,
    pub width: NumericInput,
    pub height: NumericInput,
    pub weight: NumericInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub weight: NumericInput,
    pub origin: String,
    pub hscode: String,
    pub amount: NumericInput,
    pub value: NumericInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "customerId": 1,
    "receiverName": "Hadi",
    "receiverPhone": "+963 11 555 0100",
    "receiverAddress": "Damascus",
    "cost": 100,
    "amountPaid": "40",
    "paymentStatus": "partially_paid",
    "paymentResponsibility": "customer",
    "packages": [{ "length": 1, "width": 1, "height": 1, "weight": 5 }],
    "items": [{ "weight": 5, "origin": "DE", "hscode": "8471.30", "amount": 2, "value": 250 }]
}))]
pub struct CreatePartialShipmentRequest {
    pub customer_id: NumericInput,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    pub receiver_address: Option<String>,
    pub cost: NumericInput,
    #[serde(default)]
    pub amount_paid: Option<NumericInput>,
    pub payment_status: PaymentStatus,
    /// Defaults to `customer`
    #[serde(default)]
    pub payment_responsibility: Option<PaymentResponsibility>,
    #[serde(default)]
    pub packages: Option<Vec<PackageInput>>,
    #[serde(default)]
    pub items: Option<Vec<ItemInput>>,
}

/// Validated package dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageDims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl PackageDims {
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemLine {
    pub weight: f64,
    pub origin: String,
    pub hscode: String,
    pub amount: f64,
    pub value: Decimal,
}

/// A creation request after parsing and validation, with derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialShipmentDraft {
    pub customer_id: i32,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub receiver_address: Option<String>,
    pub cost: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_responsibility: PaymentResponsibility,
    pub packages: Vec<PackageDims>,
    pub items: Vec<ItemLine>,
    pub total_volume: f64,
    pub total_weight: f64,
    pub outstanding: Decimal,
}

/// Returns `(total_volume, total_weight)` where volume is the sum of
/// length × width × height and weight the sum of package weights.
pub fn package_totals(packages: &[PackageDims]) -> (f64, f64) {
    packages.iter().fold((0.0, 0.0), |(volume, weight), p| {
        (volume + p.volume(), weight + p.weight)
    })
}

/// Unpaid portion of the cost. Always zero once the shipment is paid.
pub fn outstanding_amount(status: PaymentStatus, cost: Decimal, amount_paid: Decimal) -> Decimal {
    if status == PaymentStatus::Paid {
        Decimal::ZERO
    } else {
        cost - amount_paid
    }
}

/// Whether the outstanding amount is added to the customer's balance.
pub fn charges_customer_balance(
    status: PaymentStatus,
    responsibility: PaymentResponsibility,
    outstanding: Decimal,
) -> bool {
    status != PaymentStatus::Paid
        && responsibility == PaymentResponsibility::Customer
        && outstanding > Decimal::ZERO
}

fn out_of_range(field: &str) -> ServiceError {
    ServiceError::ValidationError(format!("{} is too large", field))
}

impl PackageInput {
    fn parse(&self, index: usize) -> Result<PackageDims, ServiceError> {
        let field = |name: &str| format!("packages[{}].{}", index, name);
        let dim = |input: &NumericInput, name: &str| {
            let name = field(name);
            require_positive(input.to_f64(&name)?, &name)
        };
        Ok(PackageDims {
            length: dim(&self.length, "length")?,
            width: dim(&self.width, "width")?,
            height: dim(&self.height, "height")?,
            weight: dim(&self.weight, "weight")?,
        })
    }
}

impl ItemInput {
    fn parse(&self, index: usize) -> Result<ItemLine, ServiceError> {
        let field = |name: &str| format!("items[{}].{}", index, name);
        let text = |value: &str, name: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ServiceError::ValidationError(format!(
                    "{} must not be empty",
                    field(name)
                )))
            } else {
                Ok(trimmed.to_string())
            }
        };

        let weight_field = field("weight");
        let amount_field = field("amount");
        let value_field = field("value");
        Ok(ItemLine {
            weight: require_non_negative(self.weight.to_f64(&weight_field)?, &weight_field)?,
            origin: text(&self.origin, "origin")?,
            hscode: text(&self.hscode, "hscode")?,
            amount: require_non_negative(self.amount.to_f64(&amount_field)?, &amount_field)?,
            value: require_non_negative_decimal(
                self.value.to_decimal(&value_field)?,
                &value_field,
            )?,
        })
    }
}

impl CreatePartialShipmentRequest {
    /// Validates the payload and derives totals. Nothing is written.
    pub fn into_draft(self) -> Result<PartialShipmentDraft, ServiceError> {
        let packages = self.packages.unwrap_or_default();
        if packages.is_empty() {
            return Err(ServiceError::ValidationError(MISSING_PACKAGES.to_string()));
        }
        let items = self.items.unwrap_or_default();
        if items.is_empty() {
            return Err(ServiceError::ValidationError(MISSING_ITEMS.to_string()));
        }

        let customer_id = self.customer_id.to_id("customerId")?;
        let cost = require_non_negative_decimal(self.cost.to_decimal("cost")?, "cost")?;
        let amount_paid = match &self.amount_paid {
            Some(input) => {
                require_non_negative_decimal(input.to_decimal("amountPaid")?, "amountPaid")?
            }
            None => Decimal::ZERO,
        };

        let packages = packages
            .iter()
            .enumerate()
            .map(|(i, p)| p.parse(i))
            .collect::<Result<Vec<_>, _>>()?;
        let items = items
            .iter()
            .enumerate()
            .map(|(i, it)| it.parse(i))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, dims) in packages.iter().enumerate() {
            if !dims.volume().is_finite() {
                return Err(out_of_range(&format!("packages[{}] volume", i)));
            }
        }
        let (total_volume, total_weight) = package_totals(&packages);
        if !total_volume.is_finite() {
            return Err(out_of_range("total package volume"));
        }
        if !total_weight.is_finite() {
            return Err(out_of_range("total package weight"));
        }
        let payment_responsibility = self.payment_responsibility.unwrap_or_default();
        let outstanding = outstanding_amount(self.payment_status, cost, amount_paid);

        Ok(PartialShipmentDraft {
            customer_id,
            receiver_name: clean_optional(self.receiver_name),
            receiver_phone: clean_optional(self.receiver_phone),
            receiver_address: clean_optional(self.receiver_address),
            cost,
            amount_paid,
            payment_status: self.payment_status,
            payment_responsibility,
            packages,
            items,
            total_volume,
            total_weight,
            outstanding,
        })
    }
}

/// Creates a partial shipment with its packages and items, bumps the parent
/// shipment totals and, when the customer owes money, the customer balance.
/// All writes share one transaction.
#[derive(Debug, Clone)]
pub struct CreatePartialShipmentCommand {
    pub shipment_id: i32,
    pub request: CreatePartialShipmentRequest,
}

#[async_trait]
impl Command for CreatePartialShipmentCommand {
    type Result = PartialShipmentDetail;

    #[instrument(skip(self, db_pool), fields(shipment_id = self.shipment_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let draft = self.request.clone().into_draft().map_err(|e| {
            error!("Partial shipment payload rejected: {}", e);
            e
        })?;

        let shipment_id = self.shipment_id;
        let detail = DatabaseAccess::new(db_pool)
            .transaction::<_, PartialShipmentDetail, ServiceError>(move |txn| {
                Box::pin(async move { Self::persist(txn, shipment_id, draft).await })
            })
            .await
            .map_err(|e| {
                error!(
                    "Transaction failed for creating partial shipment on shipment {}: {}",
                    shipment_id, e
                );
                e
            })?;

        info!(
            partial_shipment_id = detail.partial.id,
            customer_id = detail.partial.customer_id,
            "Partial shipment created"
        );
        Ok(detail)
    }
}

impl CreatePartialShipmentCommand {
    async fn persist(
        txn: &DatabaseTransaction,
        shipment_id: i32,
        draft: PartialShipmentDraft,
    ) -> Result<PartialShipmentDetail, ServiceError> {
        let PartialShipmentDraft {
            customer_id,
            receiver_name,
            receiver_phone,
            receiver_address,
            cost,
            amount_paid,
            payment_status,
            payment_responsibility,
            packages: package_dims,
            items: item_lines,
            total_volume,
            total_weight,
            outstanding,
        } = draft;

        let parent = shipment::Entity::find_by_id(shipment_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipment"))?;
        if !parent.is_open {
            return Err(ServiceError::Conflict(format!(
                "Shipment {} is closed",
                shipment_id
            )));
        }

        customer::Entity::find_by_id(customer_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer"))?;

        let partial = partial_shipment::ActiveModel {
            shipment_id: Set(shipment_id),
            customer_id: Set(customer_id),
            receiver_name: Set(receiver_name),
            receiver_phone: Set(receiver_phone),
            receiver_address: Set(receiver_address),
            volume: Set(total_volume),
            cost: Set(cost),
            amount_paid: Set(amount_paid),
            payment_status: Set(payment_status),
            payment_responsibility: Set(payment_responsibility),
            is_paid: Set(payment_status == PaymentStatus::Paid),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let mut packages = Vec::with_capacity(package_dims.len());
        for dims in package_dims {
            let saved = package::ActiveModel {
                partial_shipment_id: Set(partial.id),
                length: Set(dims.length),
                width: Set(dims.width),
                height: Set(dims.height),
                weight: Set(dims.weight),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            packages.push(saved);
        }

        let mut items = Vec::with_capacity(item_lines.len());
        for line in item_lines {
            let saved = item::ActiveModel {
                partial_shipment_id: Set(partial.id),
                weight: Set(line.weight),
                origin: Set(line.origin),
                hscode: Set(line.hscode),
                amount: Set(line.amount),
                value: Set(line.value),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            items.push(saved);
        }

        let totals = shipment::Entity::update_many()
            .col_expr(
                shipment::Column::TotalVolume,
                Expr::col(shipment::Column::TotalVolume).add(total_volume),
            )
            .col_expr(
                shipment::Column::TotalWeight,
                Expr::col(shipment::Column::TotalWeight).add(total_weight),
            )
            .filter(shipment::Column::Id.eq(shipment_id))
            .exec(txn)
            .await?;
        if totals.rows_affected == 0 {
            return Err(ServiceError::not_found("Shipment"));
        }

        if charges_customer_balance(payment_status, payment_responsibility, outstanding) {
            let balance = customer::Entity::update_many()
                .col_expr(
                    customer::Column::Balance,
                    Expr::col(customer::Column::Balance).add(outstanding),
                )
                .filter(customer::Column::Id.eq(customer_id))
                .exec(txn)
                .await?;
            if balance.rows_affected == 0 {
                return Err(ServiceError::not_found("Customer"));
            }
        }

        Ok(PartialShipmentDetail {
            partial,
            packages,
            items,
            customer: None,
        })
    }
}
