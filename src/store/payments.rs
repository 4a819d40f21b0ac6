//! Payments per project, the user's own payments and wallets.

use std::collections::HashMap;

use crate::api::payments;
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{Payment, PaymentPayload, PaymentStatus, Wallet};
use crate::ports::SessionUser;

use super::tracked;

/// Cached payments and wallets.
#[derive(Debug, Default)]
pub struct PaymentsSlice {
    /// Wallets of the current user.
    pub wallets: Vec<Wallet>,
    /// Payments per project id, newest first.
    pub by_project: HashMap<String, Vec<Payment>>,
    /// Payments the current user sent or received, newest first.
    pub mine: Vec<Payment>,
    /// A request is in flight.
    pub loading: bool,
}

impl PaymentsSlice {
    /// Cached payments of a project; empty if never loaded.
    #[must_use]
    pub fn project_payments(&self, task_id: &str) -> &[Payment] {
        self.by_project.get(task_id).map_or(&[], Vec::as_slice)
    }

    /// Loads the user's wallets. The guest user has none and triggers no call.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cached wallets are kept.
    pub async fn get_wallets(&mut self, ctx: &ServiceContext, user: &SessionUser) -> Result<&[Wallet], AppError> {
        if user.is_guest() {
            self.wallets.clear();
            return Ok(&self.wallets);
        }
        self.wallets =
            tracked(&mut self.loading, "get_wallets", payments::fetch_wallets(ctx, &user.id)).await?;
        Ok(&self.wallets)
    }

    /// Loads a project's payments.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn get_project_payments(&mut self, ctx: &ServiceContext, task_id: &str) -> Result<&[Payment], AppError> {
        let list = tracked(
            &mut self.loading,
            "get_project_payments",
            payments::fetch_payments_by_project(ctx, task_id),
        )
        .await?;
        self.by_project.insert(task_id.to_string(), list);
        Ok(self.project_payments(task_id))
    }

    /// Loads the payments `user_id` sent or received.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cached list is kept.
    pub async fn get_my_payments(&mut self, ctx: &ServiceContext, user_id: &str) -> Result<&[Payment], AppError> {
        self.mine =
            tracked(&mut self.loading, "get_my_payments", payments::fetch_my_payments(ctx, user_id)).await?;
        Ok(&self.mine)
    }

    /// Creates a payment and puts it first in its project's list and in the user's list.
    ///
    /// # Errors
    ///
    /// Returns the validation or insert error; the cache is untouched.
    pub async fn create_payment(&mut self, ctx: &ServiceContext, payload: &PaymentPayload) -> Result<Payment, AppError> {
        let payment =
            tracked(&mut self.loading, "create_payment", payments::create_payment(ctx, payload)).await?;
        self.by_project.entry(payment.task_id.clone()).or_default().insert(0, payment.clone());
        self.mine.insert(0, payment.clone());
        Ok(payment)
    }

    /// Changes a payment's status and replaces every cached copy.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or the update error; the cache is untouched.
    pub async fn update_payment_status(
        &mut self,
        ctx: &ServiceContext,
        id: &str,
        status: PaymentStatus,
    ) -> Result<Payment, AppError> {
        let payment = tracked(
            &mut self.loading,
            "update_payment_status",
            payments::update_payment_status(ctx, id, status),
        )
        .await?;
        let lists = self.by_project.values_mut().chain(std::iter::once(&mut self.mine));
        for list in lists {
            for cached in list.iter_mut().filter(|p| p.id == payment.id) {
                *cached = payment.clone();
            }
        }
        Ok(payment)
    }
}
