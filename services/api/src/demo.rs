use crate::infra::InMemoryRentalRepository;
use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;
use verhuur::error::AppError;
use verhuur::rentals::billing::BillingConfig;
use verhuur::rentals::policy::{Actor, ActorRole, RoleMatrix};
use verhuur::rentals::repository::{NotifyError, TransitionNotice, TransitionNotifier};
use verhuur::rentals::service::BackOffice;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Tenant name used for the demo booking.
    #[arg(long)]
    pub(crate) tenant: Option<String>,
    /// Rental period start (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) starts_on: Option<NaiveDate>,
    /// Rental period end (YYYY-MM-DD). Defaults to starts_on + 2 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) ends_on: Option<NaiveDate>,
    /// Invoice amount for the booking.
    #[arg(long, value_parser = crate::infra::parse_amount)]
    pub(crate) rent: Option<Decimal>,
    /// Deposit paid up front.
    #[arg(long, value_parser = crate::infra::parse_amount)]
    pub(crate) deposit: Option<Decimal>,
    /// Amount withheld from the deposit at settlement.
    #[arg(long, value_parser = crate::infra::parse_amount)]
    pub(crate) revoked: Option<Decimal>,
}

/// Prints every committed transition, standing in for the mail transport.
struct ConsoleNotifier;

impl TransitionNotifier for ConsoleNotifier {
    fn publish(&self, notice: TransitionNotice) -> Result<(), NotifyError> {
        println!(
            "  [notice] {} {} moved {} -> {}",
            notice.entity, notice.entity_id, notice.from, notice.to
        );
        Ok(())
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let tenant = args.tenant.unwrap_or_else(|| "J. Jansen".to_string());
    let starts_on = args
        .starts_on
        .unwrap_or_else(|| Local::now().date_naive());
    let ends_on = args
        .ends_on
        .unwrap_or_else(|| starts_on + chrono::Duration::days(2));
    let rent = args.rent.unwrap_or_else(|| Decimal::new(45000, 2));
    let deposit_paid = args.deposit.unwrap_or_else(|| Decimal::new(25000, 2));
    let revoked = args.revoked.unwrap_or_else(|| Decimal::new(5000, 2));

    let repository = Arc::new(InMemoryRentalRepository::default());
    let service = BackOffice::new(
        repository,
        Arc::new(ConsoleNotifier),
        Arc::new(RoleMatrix),
        BillingConfig::default(),
    );

    let admin = Actor {
        id: "demo-admin".to_string(),
        role: ActorRole::Administrator,
    };
    let staff = Actor {
        id: "demo-staff".to_string(),
        role: ActorRole::BackOffice,
    };

    println!("Rental back office demo");
    println!("Booking for {tenant}: {starts_on} -> {ends_on}");

    let lease = service.register_lease(tenant, starts_on, ends_on)?;
    println!("- Registered {} in status {}", lease.id.0, lease.status);

    // A request cannot jump straight to confirmed.
    match service.confirm_lease(&staff, &lease.id) {
        Err(err) => println!("- Early confirmation rejected: {err}"),
        Ok(_) => println!("- Unexpected: early confirmation accepted"),
    }

    let lease = service.option_lease(&staff, &lease.id)?;
    println!("- Optioned: {}", lease.status);
    let lease = service.confirm_lease(&staff, &lease.id)?;
    println!("- Confirmed: {}", lease.status);

    let invoice = service.draft_invoice(lease.id.clone(), rent)?;
    println!("- Drafted invoice {} over {}", invoice.id.0, invoice.amount);
    let invoice = service.open_invoice(&staff, &invoice.id)?;
    match invoice.due_at {
        Some(due_at) => println!("- Opened for payment, due {due_at}"),
        None => println!("- Opened for payment"),
    }

    // Settling money is reserved for administrators.
    match service.mark_invoice_paid(&staff, &invoice.id) {
        Err(err) => println!("- Staff payment attempt blocked: {err}"),
        Ok(_) => println!("- Unexpected: staff settled the invoice"),
    }
    let invoice = service.mark_invoice_paid(&admin, &invoice.id)?;
    println!("- Paid at {:?}", invoice.paid_at);

    let deposit = service.register_deposit(lease.id.clone(), deposit_paid)?;
    println!("- Deposit {} registered over {}", deposit.id.0, deposit.paid_amount);
    let deposit = service.settle_deposit(&admin, &deposit.id, revoked)?;
    println!(
        "- Deposit settled as {}: withheld {:?}, refunded {:?}",
        deposit.status, deposit.revoked_amount, deposit.refunded_amount
    );

    let lease = service.finalize_lease(&admin, &lease.id)?;
    println!("- Lease closed out as {}", lease.status);

    let issue = service.report_issue(
        "lekkage in de kelder".to_string(),
        "huurder".to_string(),
    )?;
    println!("- Issue {} reported: {}", issue.id.0, issue.summary);
    let issue = service.close_issue(&staff, &issue.id)?;
    println!("- Issue closed at {:?}", issue.closed_at);
    match service.close_issue(&staff, &issue.id) {
        Err(err) => println!("- Second close rejected: {err}"),
        Ok(_) => println!("- Unexpected: issue closed twice"),
    }

    Ok(())
}
