//! Billing plan and billing agreement operations (v1 payments API).

use crate::client::PayPalClient;
use crate::core::HttpMethod;
use crate::error::{PaymentError, PaymentResult};
use crate::services::vault::CreditCard;
use crate::types::{CurrencyValue, Link, Patch, ShippingAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

const PLANS_PATH: &str = "/v1/payments/billing-plans";
const AGREEMENTS_PATH: &str = "/v1/payments/billing-agreements";

/// Service for billing plans and agreements.
pub struct BillingService<'a> {
    client: &'a PayPalClient,
}

impl<'a> BillingService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Lists billing plans.
    pub async fn list_plans(&self, params: &BillingPlanListParams) -> PaymentResult<BillingPlanList> {
        self.client.get_with_query(PLANS_PATH, params).await
    }

    /// Creates a billing plan. New plans start inactive.
    pub async fn create_plan(&self, plan: &BillingPlan) -> PaymentResult<CreateBillingResponse> {
        self.client.post(PLANS_PATH, plan).await
    }

    /// Replaces values inside a billing plan, one `replace` patch per entry.
    pub async fn update_plan<I, P>(&self, plan_id: &str, values: I) -> PaymentResult<()>
    where
        I: IntoIterator<Item = (P, serde_json::Value)>,
        P: Into<String>,
    {
        let patches: Vec<Patch> = values
            .into_iter()
            .map(|(path, value)| Patch::replace(path, value))
            .collect();

        self.client
            .patch_no_content(&format!("{}/{}", PLANS_PATH, plan_id), &patches)
            .await
    }

    /// Activates a billing plan.
    pub async fn activate_plan(&self, plan_id: &str) -> PaymentResult<()> {
        self.update_plan(plan_id, [("/", json!({"state": "ACTIVE"}))])
            .await
    }

    /// Creates an agreement for an existing plan.
    ///
    /// Only the plan id is sent; any other plan fields on `agreement` are dropped.
    pub async fn create_agreement(
        &self,
        agreement: &BillingAgreement,
    ) -> PaymentResult<CreateAgreementResponse> {
        let mut agreement = agreement.clone();
        agreement.plan = BillingPlan {
            id: agreement.plan.id.take(),
            ..Default::default()
        };

        self.client.post(AGREEMENTS_PATH, &agreement).await
    }

    /// Executes an agreement the payer has approved.
    ///
    /// A response without an agreement id is reported as
    /// [`PaymentError::AgreementExecution`].
    pub async fn execute_agreement(&self, token: &str) -> PaymentResult<ExecuteAgreementResponse> {
        let request = self.client.new_request(
            HttpMethod::Post,
            self.client
                .url(&format!("{}/{}/agreement-execute", AGREEMENTS_PATH, token)),
            None::<&()>,
        )?;

        let response: ExecuteAgreementResponse = self.client.send_with_auth(request).await?;
        if response.id.is_empty() {
            warn!(token, "agreement execution returned no agreement id");
            return Err(PaymentError::AgreementExecution {
                token: token.to_string(),
            });
        }
        Ok(response)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingPlanListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// `CREATED`, `ACTIVE`, `INACTIVE` or `ALL`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_required: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingPlanList {
    #[serde(default)]
    pub plans: Vec<BillingPlan>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `FIXED` or `INFINITE`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_definitions: Vec<PaymentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_preferences: Option<MerchantPreferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// `TRIAL` or `REGULAR`.
    #[serde(rename = "type")]
    pub kind: String,
    pub frequency: String,
    pub frequency_interval: String,
    pub amount: CurrencyValue,
    pub cycles: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charge_models: Vec<ChargeModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeModel {
    /// `SHIPPING` or `TAX`.
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: CurrencyValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_fee: Option<CurrencyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_bill_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_fail_amount_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fail_attempts: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBillingResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub payment_definitions: Vec<PaymentDefinition>,
    pub merchant_preferences: Option<MerchantPreferences>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingAgreement {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub plan: BillingPlan,
    pub payer: Payer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_merchant_preferences: Option<MerchantPreferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payer {
    /// `paypal` or `credit_card`.
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funding_instruments: Vec<FundingInstrument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_info: Option<PayerInfo>,
    #[serde(rename = "payer_status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundingInstrument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_token: Option<CreditCardToken>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditCardToken {
    pub credit_card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAgreementResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub plan: Option<BillingPlan>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub start_time: Option<DateTime<Utc>>,
}

impl CreateAgreementResponse {
    /// Link the payer follows to approve the agreement.
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteAgreementResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub state: String,
    pub description: Option<String>,
    pub payer: Option<Payer>,
    pub plan: Option<BillingPlan>,
    pub start_date: Option<DateTime<Utc>>,
    pub shipping_address: Option<ShippingAddress>,
    pub agreement_details: Option<AgreementDetails>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgreementDetails {
    pub outstanding_balance: Option<CurrencyValue>,
    pub cycles_remaining: Option<String>,
    pub cycles_completed: Option<String>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub last_payment_amount: Option<CurrencyValue>,
    pub final_payment_date: Option<DateTime<Utc>>,
    pub failed_payment_count: Option<String>,
}
