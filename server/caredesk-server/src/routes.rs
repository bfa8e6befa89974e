use crate::handlers::{billing, health, insurance, pharmacy, records, registry, reports};
use crate::server::CareDeskServer;
use axum::{
    routing::{get, patch, post, MethodRouter},
    Router,
};
use billing_service::Invoice;
use database_layer::Entity;
use insurance_service::{InsuranceClaim, InsuranceCompany, InsurancePolicy};
use pharmacy_service::{Medicine, Prescription};
use registry_service::{Admission, Appointment, Doctor, LabOrder, Patient};

/// All routes; `/health` is also reachable outside the versioned prefix
pub fn create_routes() -> Router<CareDeskServer> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes())
}

fn api_routes() -> Router<CareDeskServer> {
    Router::new()
        .route("/health", get(health::health_check))
        // Registry
        .nest(
            "/patients",
            collection::<Patient>(Some(post(records::create::<Patient>)))
                .route("/:id/policies", get(insurance::patient_policies)),
        )
        .nest(
            "/doctors",
            collection::<Doctor>(Some(post(records::create::<Doctor>))),
        )
        .nest(
            "/appointments",
            collection::<Appointment>(Some(post(registry::book_appointment)))
                .route("/:id/reschedule", post(registry::reschedule_appointment)),
        )
        .nest(
            "/admissions",
            collection::<Admission>(Some(post(registry::admit)))
                .route("/:id/discharge", post(registry::discharge))
                .route("/:id/transfer", post(registry::transfer)),
        )
        .nest(
            "/lab-orders",
            collection::<LabOrder>(Some(post(records::create::<LabOrder>))),
        )
        // Pharmacy
        .nest(
            "/medicines",
            collection::<Medicine>(Some(post(records::create::<Medicine>))),
        )
        .nest(
            "/prescriptions",
            collection::<Prescription>(Some(post(records::create::<Prescription>)))
                .route("/:id/dispense", post(pharmacy::dispense)),
        )
        // Billing
        .nest(
            "/invoices",
            collection::<Invoice>(Some(post(billing::create_invoice)))
                .route("/:id/payments", post(billing::record_payment)),
        )
        // Insurance; claims are only raised by payments
        .nest(
            "/insurance/companies",
            collection::<InsuranceCompany>(Some(post(insurance::register_company))),
        )
        .nest(
            "/insurance/policies",
            collection::<InsurancePolicy>(Some(post(insurance::register_policy))),
        )
        .nest(
            "/insurance/claims",
            collection::<InsuranceClaim>(None)
                .route("/:id/status", patch(insurance::update_claim_status)),
        )
        .route("/insurance/co-pay", post(insurance::co_pay_quote))
        // Reporting
        .route("/dashboard/stats", get(reports::dashboard_stats))
        .route("/reports/revenue", get(reports::revenue_report))
}

/// List and item routes for one collection, with an optional create handler
fn collection<T: Entity>(create: Option<MethodRouter<CareDeskServer>>) -> Router<CareDeskServer> {
    let root = get(records::list::<T>);
    let root = match create {
        Some(create) => root.merge(create),
        None => root,
    };
    Router::new().route("/", root).route(
        "/:id",
        get(records::get::<T>)
            .patch(records::update::<T>)
            .delete(records::delete::<T>),
    )
}
