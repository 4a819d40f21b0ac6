//! Contracts list and the contract being viewed.

use crate::api::contracts::{self, Party};
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{Contract, ContractPatch, ContractPayload};

use super::tracked;

/// Cached contracts, newest first.
#[derive(Debug, Default)]
pub struct ContractsSlice {
    /// Contracts.
    pub list: Vec<Contract>,
    /// Contract being viewed or edited.
    pub selected: Option<Contract>,
    /// A request is in flight.
    pub loading: bool,
}

impl ContractsSlice {
    /// Loads every visible contract.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cached list is kept.
    pub async fn get_list(&mut self, ctx: &ServiceContext) -> Result<&[Contract], AppError> {
        self.list = tracked(&mut self.loading, "get_contracts", contracts::fetch_contracts(ctx)).await?;
        Ok(&self.list)
    }

    /// Loads one contract, moves it to the front of the list and selects it.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn get_by_id(&mut self, ctx: &ServiceContext, id: &str) -> Result<&Contract, AppError> {
        let contract =
            tracked(&mut self.loading, "get_contract", contracts::fetch_contract_by_id(ctx, id)).await?;
        self.list.retain(|c| c.id != contract.id);
        self.list.insert(0, contract.clone());
        Ok(self.selected.insert(contract))
    }

    /// Creates a DRAFT contract and puts it first in the list.
    ///
    /// # Errors
    ///
    /// Returns the validation or insert error; the cache is untouched.
    pub async fn create(&mut self, ctx: &ServiceContext, payload: &ContractPayload) -> Result<&Contract, AppError> {
        let contract =
            tracked(&mut self.loading, "create_contract", contracts::create_contract(ctx, payload)).await?;
        self.list.insert(0, contract);
        Ok(&self.list[0])
    }

    /// Applies a partial update and refreshes both the list entry and the selection.
    ///
    /// # Errors
    ///
    /// Returns the update error; the cache is untouched.
    pub async fn save(&mut self, ctx: &ServiceContext, id: &str, patch: &ContractPatch) -> Result<&Contract, AppError> {
        let contract =
            tracked(&mut self.loading, "save_contract", contracts::update_contract(ctx, id, patch)).await?;
        Ok(self.replace(contract))
    }

    /// Deletes a contract and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Returns the delete error; the cache is untouched.
    pub async fn delete(&mut self, ctx: &ServiceContext, id: &str) -> Result<(), AppError> {
        tracked(&mut self.loading, "delete_contract", contracts::delete_contract(ctx, id)).await?;
        self.list.retain(|c| c.id != id);
        if self.selected.as_ref().is_some_and(|c| c.id == id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Uploads a file into the contract's folder and returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns the upload error.
    pub async fn upload_file(
        &mut self,
        ctx: &ServiceContext,
        contract: &Contract,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let path = format!("{}/{file_name}", contract.file_folder());
        tracked(&mut self.loading, "upload_contract_file", contracts::upload_contract_file(ctx, &path, bytes))
            .await
    }

    /// Signs as the creator (party A), moving a DRAFT to PENDING.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` when `user_id` may not sign now, or the update error.
    pub async fn sign_as_party_a(&mut self, ctx: &ServiceContext, id: &str, user_id: &str) -> Result<&Contract, AppError> {
        self.sign(ctx, id, Party::A, user_id).await
    }

    /// Signs as the contractor (party B), moving a PENDING contract to SIGNED.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` when `user_id` may not sign now, or the update error.
    pub async fn sign_as_party_b(&mut self, ctx: &ServiceContext, id: &str, user_id: &str) -> Result<&Contract, AppError> {
        self.sign(ctx, id, Party::B, user_id).await
    }

    async fn sign(&mut self, ctx: &ServiceContext, id: &str, party: Party, user_id: &str) -> Result<&Contract, AppError> {
        let current =
            tracked(&mut self.loading, "get_contract", contracts::fetch_contract_by_id(ctx, id)).await?;
        let signed = tracked(
            &mut self.loading,
            "sign_contract",
            contracts::sign_contract(ctx, &current, party, user_id),
        )
        .await?;
        Ok(self.replace(signed))
    }

    fn replace(&mut self, contract: Contract) -> &Contract {
        if let Some(existing) = self.list.iter_mut().find(|c| c.id == contract.id) {
            // Keep the embedded project summary; write responses do not carry it.
            let task = existing.task.take();
            *existing = Contract { task: contract.task.clone().or(task), ..contract.clone() };
        }
        self.selected.insert(contract)
    }
}
