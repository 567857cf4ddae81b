//! Catalog products, subscription plans and subscriptions.

use crate::client::PayPalClient;
use crate::core::HttpMethod;
use crate::error::PaymentResult;
use crate::services::orders::{ApplicationContext, PartyName, ShippingDetail};
use crate::types::{CurrencyValue, Link, ListParams, Money, Patch};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

const PRODUCTS_PATH: &str = "/v1/catalogs/products";
const PLANS_PATH: &str = "/v1/billing/plans";
const SUBSCRIPTIONS_PATH: &str = "/v1/billing/subscriptions";

/// Service for the subscriptions API.
pub struct SubscriptionsService<'a> {
    client: &'a PayPalClient,
}

impl<'a> SubscriptionsService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    // Products

    pub async fn create_product(&self, product: &Product) -> PaymentResult<ProductResponse> {
        self.client.post(PRODUCTS_PATH, product).await
    }

    /// Replaces the mutable fields of `product` on the stored product.
    pub async fn update_product(&self, product: &Product) -> PaymentResult<()> {
        self.client
            .patch_no_content(
                &format!("{}/{}", PRODUCTS_PATH, product.id.as_deref().unwrap_or_default()),
                &product.update_patch(),
            )
            .await
    }

    pub async fn get_product(&self, product_id: &str) -> PaymentResult<ProductResponse> {
        self.client
            .get(&format!("{}/{}", PRODUCTS_PATH, product_id))
            .await
    }

    pub async fn list_products(&self, params: &ListParams) -> PaymentResult<ProductList> {
        self.client.get_with_query(PRODUCTS_PATH, params).await
    }

    // Plans

    pub async fn create_plan(&self, plan: &SubscriptionPlan) -> PaymentResult<SubscriptionPlan> {
        self.client.post(PLANS_PATH, plan).await
    }

    /// Replaces the mutable fields of `plan` on the stored plan.
    pub async fn update_plan(&self, plan: &SubscriptionPlan) -> PaymentResult<()> {
        self.client
            .patch_no_content(
                &format!("{}/{}", PLANS_PATH, plan.id.as_deref().unwrap_or_default()),
                &plan.update_patch(),
            )
            .await
    }

    pub async fn get_plan(&self, plan_id: &str) -> PaymentResult<SubscriptionPlan> {
        self.client.get(&format!("{}/{}", PLANS_PATH, plan_id)).await
    }

    pub async fn list_plans(&self, params: &PlanListParams) -> PaymentResult<PlanList> {
        self.client.get_with_query(PLANS_PATH, params).await
    }

    pub async fn activate_plan(&self, plan_id: &str) -> PaymentResult<()> {
        self.client
            .post_no_content(&format!("{}/{}/activate", PLANS_PATH, plan_id), None::<&()>)
            .await
    }

    pub async fn deactivate_plan(&self, plan_id: &str) -> PaymentResult<()> {
        self.client
            .post_no_content(&format!("{}/{}/deactivate", PLANS_PATH, plan_id), None::<&()>)
            .await
    }

    /// Changes the price of one or more billing cycles.
    pub async fn update_plan_pricing(
        &self,
        plan_id: &str,
        schemes: &[PricingSchemeUpdate],
    ) -> PaymentResult<()> {
        self.client
            .post_no_content(
                &format!("{}/{}/update-pricing-schemes", PLANS_PATH, plan_id),
                Some(&json!({ "pricing_schemes": schemes })),
            )
            .await
    }

    // Subscriptions

    /// Creates a subscription. The full representation is always requested.
    pub async fn create(&self, subscription: &SubscriptionBase) -> PaymentResult<Subscription> {
        let mut request = self.client.new_request(
            HttpMethod::Post,
            self.client.url(SUBSCRIPTIONS_PATH),
            Some(subscription),
        )?;
        request.set_header("prefer", "return=representation");
        self.client.send_with_auth(request).await
    }

    pub async fn update(&self, subscription_id: &str, patches: &[Patch]) -> PaymentResult<()> {
        self.client
            .patch_no_content(&format!("{}/{}", SUBSCRIPTIONS_PATH, subscription_id), patches)
            .await
    }

    pub async fn get(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        self.client
            .get(&format!("{}/{}", SUBSCRIPTIONS_PATH, subscription_id))
            .await
    }

    pub async fn activate(&self, subscription_id: &str, reason: &str) -> PaymentResult<()> {
        self.transition(subscription_id, "activate", reason).await
    }

    pub async fn suspend(&self, subscription_id: &str, reason: &str) -> PaymentResult<()> {
        self.transition(subscription_id, "suspend", reason).await
    }

    pub async fn cancel(&self, subscription_id: &str, reason: &str) -> PaymentResult<()> {
        self.transition(subscription_id, "cancel", reason).await
    }

    /// Captures an outstanding balance from the subscriber.
    pub async fn capture(
        &self,
        subscription_id: &str,
        capture: &SubscriptionCaptureRequest,
    ) -> PaymentResult<SubscriptionTransaction> {
        self.client
            .post(&format!("{}/{}/capture", SUBSCRIPTIONS_PATH, subscription_id), capture)
            .await
    }

    /// Changes the plan or quantity of a subscription.
    pub async fn revise(
        &self,
        subscription_id: &str,
        revision: &SubscriptionBase,
    ) -> PaymentResult<Subscription> {
        self.client
            .post(&format!("{}/{}/revise", SUBSCRIPTIONS_PATH, subscription_id), revision)
            .await
    }

    /// Lists the transactions of a subscription between two instants.
    pub async fn transactions(
        &self,
        subscription_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> PaymentResult<SubscriptionTransactionList> {
        self.client
            .get_with_query(
                &format!("{}/{}/transactions", SUBSCRIPTIONS_PATH, subscription_id),
                &[
                    ("start_time", start_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ("end_time", end_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ],
            )
            .await
    }

    async fn transition(&self, subscription_id: &str, action: &str, reason: &str) -> PaymentResult<()> {
        self.client
            .post_no_content(
                &format!("{}/{}/{}", SUBSCRIPTIONS_PATH, subscription_id, action),
                Some(&json!({ "reason": reason })),
            )
            .await
    }
}

/// Catalog product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// `PHYSICAL`, `DIGITAL` or `SERVICE`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
}

impl Product {
    /// `replace` patches for the fields PayPal lets you change.
    pub fn update_patch(&self) -> Vec<Patch> {
        [
            ("/description", &self.description),
            ("/category", &self.category),
            ("/image_url", &self.image_url),
            ("/home_url", &self.home_url),
        ]
        .into_iter()
        .filter_map(|(path, value)| value.as_ref().map(|v| Patch::replace(path, json!(v))))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Subscription plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product_id: String,
    pub name: String,
    /// `CREATED`, `ACTIVE` or `INACTIVE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub billing_cycles: Vec<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_preferences: Option<PaymentPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Taxes>,
    #[serde(default)]
    pub quantity_supported: bool,
    #[serde(default, skip_serializing)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub links: Vec<Link>,
}

impl SubscriptionPlan {
    /// `replace` patches for the fields PayPal lets you change.
    pub fn update_patch(&self) -> Vec<Patch> {
        let mut patches = Vec::new();
        if let Some(description) = &self.description {
            patches.push(Patch::replace("/description", json!(description)));
        }
        if let Some(prefs) = &self.payment_preferences {
            patches.push(Patch::replace(
                "/payment_preferences/auto_bill_outstanding",
                json!(prefs.auto_bill_outstanding),
            ));
            patches.push(Patch::replace(
                "/payment_preferences/payment_failure_threshold",
                json!(prefs.payment_failure_threshold),
            ));
            if let Some(fee) = &prefs.setup_fee {
                patches.push(Patch::replace("/payment_preferences/setup_fee", json!(fee)));
            }
            if let Some(action) = &prefs.setup_fee_failure_action {
                patches.push(Patch::replace(
                    "/payment_preferences/setup_fee_failure_action",
                    json!(action),
                ));
            }
        }
        if let Some(taxes) = &self.taxes {
            patches.push(Patch::replace("/taxes/percentage", json!(taxes.percentage)));
        }
        patches
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingCycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_scheme: Option<PricingScheme>,
    pub frequency: Frequency,
    /// `REGULAR` or `TRIAL`.
    pub tenure_type: String,
    pub sequence: u32,
    /// Zero means the cycle repeats forever.
    pub total_cycles: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub fixed_price: Money,
    #[serde(default, skip_serializing)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frequency {
    /// `DAY`, `WEEK`, `MONTH` or `YEAR`.
    pub interval_unit: String,
    pub interval_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPreferences {
    #[serde(default)]
    pub auto_bill_outstanding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee: Option<Money>,
    /// `CONTINUE` or `CANCEL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee_failure_action: Option<String>,
    #[serde(default)]
    pub payment_failure_threshold: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Taxes {
    pub percentage: String,
    #[serde(default)]
    pub inclusive: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Comma separated, at most ten ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_ids: Option<String>,
    #[serde(flatten)]
    pub list: ListParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanList {
    #[serde(default)]
    pub plans: Vec<SubscriptionPlan>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingSchemeUpdate {
    pub billing_cycle_sequence: u32,
    pub pricing_scheme: PricingScheme,
}

/// Fields supplied when creating or revising a subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionBase {
    #[serde(default)]
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Subscriber>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_renewal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<PartyName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Subscription as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub base: SubscriptionBase,
    /// `APPROVAL_PENDING`, `APPROVED`, `ACTIVE`, `SUSPENDED`, `CANCELLED` or `EXPIRED`.
    #[serde(default)]
    pub status: String,
    pub status_change_note: Option<String>,
    pub status_update_time: Option<DateTime<Utc>>,
    pub billing_info: Option<BillingInfo>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Subscription {
    /// Link the subscriber follows to approve the subscription.
    pub fn approve_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingInfo {
    pub outstanding_balance: Option<CurrencyValue>,
    #[serde(default)]
    pub cycle_executions: Vec<CycleExecution>,
    pub last_payment: Option<LastPayment>,
    pub next_billing_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_payments_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycleExecution {
    #[serde(default)]
    pub tenure_type: String,
    #[serde(default)]
    pub sequence: u32,
    #[serde(default)]
    pub cycles_completed: u32,
    #[serde(default)]
    pub cycles_remaining: u32,
    #[serde(default)]
    pub total_cycles: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LastPayment {
    pub amount: Option<Money>,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCaptureRequest {
    pub note: String,
    /// Only `OUTSTANDING_BALANCE` is accepted.
    pub capture_type: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionTransaction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub amount_with_breakdown: Option<AmountWithBreakdown>,
    pub payer_name: Option<PartyName>,
    pub payer_email: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmountWithBreakdown {
    pub gross_amount: Option<Money>,
    pub fee_amount: Option<Money>,
    pub shipping_amount: Option<Money>,
    pub tax_amount: Option<Money>,
    pub net_amount: Option<Money>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionTransactionList {
    #[serde(default)]
    pub transactions: Vec<SubscriptionTransaction>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}
