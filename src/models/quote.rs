use serde::{Deserialize, Serialize};

/// One editable field of a quote. Carries the spreadsheet cell it is imported
/// from, its form key and the label shown next to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteField {
    Brand,
    Model,
    PlanName,
    PlanType,
    TotalInstallments,
    Installment1,
    Installments2To12,
    Installments13To84,
    PureInstallment,
    Adjudication,
    GuaranteedDelivery,
    ExtraordinaryPayment,
    TotalPlanValue,
}

impl QuoteField {
    /// Form order of the workspace inputs.
    pub const ALL: [QuoteField; 13] = [
        QuoteField::Brand,
        QuoteField::Model,
        QuoteField::PlanName,
        QuoteField::PlanType,
        QuoteField::TotalInstallments,
        QuoteField::Installment1,
        QuoteField::Installments2To12,
        QuoteField::Installments13To84,
        QuoteField::PureInstallment,
        QuoteField::Adjudication,
        QuoteField::GuaranteedDelivery,
        QuoteField::ExtraordinaryPayment,
        QuoteField::TotalPlanValue,
    ];

    pub fn cell_address(self) -> &'static str {
        match self {
            QuoteField::PlanName => "B1",
            QuoteField::Model => "B2",
            QuoteField::PlanType => "B3",
            QuoteField::TotalInstallments => "B4",
            QuoteField::Installment1 => "B5",
            QuoteField::Installments2To12 => "B6",
            QuoteField::Installments13To84 => "B7",
            QuoteField::PureInstallment => "B8",
            QuoteField::Adjudication => "B9",
            QuoteField::GuaranteedDelivery => "B10",
            QuoteField::ExtraordinaryPayment => "B11",
            QuoteField::TotalPlanValue => "B12",
            QuoteField::Brand => "B13",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            QuoteField::Brand => "brand",
            QuoteField::Model => "model",
            QuoteField::PlanName => "plan_name",
            QuoteField::PlanType => "plan_type",
            QuoteField::TotalInstallments => "total_installments",
            QuoteField::Installment1 => "installment_1",
            QuoteField::Installments2To12 => "installments_2_to_12",
            QuoteField::Installments13To84 => "installments_13_to_84",
            QuoteField::PureInstallment => "pure_installment",
            QuoteField::Adjudication => "adjudication",
            QuoteField::GuaranteedDelivery => "guaranteed_delivery",
            QuoteField::ExtraordinaryPayment => "extraordinary_payment",
            QuoteField::TotalPlanValue => "total_plan_value",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuoteField::Brand => "Marca",
            QuoteField::Model => "Modelo",
            QuoteField::PlanName => "Nombre del Plan",
            QuoteField::PlanType => "Tipo de Plan",
            QuoteField::TotalInstallments => "Total de Cuotas",
            QuoteField::Installment1 => "Cuota 1",
            QuoteField::Installments2To12 => "Cuotas 2 a 12",
            QuoteField::Installments13To84 => "Cuotas 13 a 84",
            QuoteField::PureInstallment => "Cuota Pura",
            QuoteField::Adjudication => "Adjudicación",
            QuoteField::GuaranteedDelivery => "Entrega Garantizada",
            QuoteField::ExtraordinaryPayment => "Pago Extraordinario",
            QuoteField::TotalPlanValue => "Valor Total del Plan",
        }
    }

    pub fn from_key(key: &str) -> Option<QuoteField> {
        QuoteField::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// The editable figures of one quote. Every value is free text; currency
/// parsing happens only when the preview is rendered.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct QuoteData {
    pub plan_name: String,
    pub model: String,
    pub plan_type: String,
    pub brand: String,
    pub total_installments: String,
    pub installment_1: String,
    pub installments_2_to_12: String,
    pub installments_13_to_84: String,
    pub pure_installment: String,
    pub adjudication: String,
    pub guaranteed_delivery: String,
    pub extraordinary_payment: String,
    pub total_plan_value: String,
}

impl QuoteData {
    pub fn get(&self, field: QuoteField) -> &str {
        match field {
            QuoteField::Brand => &self.brand,
            QuoteField::Model => &self.model,
            QuoteField::PlanName => &self.plan_name,
            QuoteField::PlanType => &self.plan_type,
            QuoteField::TotalInstallments => &self.total_installments,
            QuoteField::Installment1 => &self.installment_1,
            QuoteField::Installments2To12 => &self.installments_2_to_12,
            QuoteField::Installments13To84 => &self.installments_13_to_84,
            QuoteField::PureInstallment => &self.pure_installment,
            QuoteField::Adjudication => &self.adjudication,
            QuoteField::GuaranteedDelivery => &self.guaranteed_delivery,
            QuoteField::ExtraordinaryPayment => &self.extraordinary_payment,
            QuoteField::TotalPlanValue => &self.total_plan_value,
        }
    }

    pub fn set(&mut self, field: QuoteField, value: impl Into<String>) {
        let slot = match field {
            QuoteField::Brand => &mut self.brand,
            QuoteField::Model => &mut self.model,
            QuoteField::PlanName => &mut self.plan_name,
            QuoteField::PlanType => &mut self.plan_type,
            QuoteField::TotalInstallments => &mut self.total_installments,
            QuoteField::Installment1 => &mut self.installment_1,
            QuoteField::Installments2To12 => &mut self.installments_2_to_12,
            QuoteField::Installments13To84 => &mut self.installments_13_to_84,
            QuoteField::PureInstallment => &mut self.pure_installment,
            QuoteField::Adjudication => &mut self.adjudication,
            QuoteField::GuaranteedDelivery => &mut self.guaranteed_delivery,
            QuoteField::ExtraordinaryPayment => &mut self.extraordinary_payment,
            QuoteField::TotalPlanValue => &mut self.total_plan_value,
        };
        *slot = value.into();
    }

    /// True when neither plan name nor model has been filled in.
    pub fn headline_is_empty(&self) -> bool {
        self.plan_name.is_empty() && self.model.is_empty()
    }
}
