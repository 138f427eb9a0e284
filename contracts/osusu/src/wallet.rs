use soroban_sdk::{symbol_short, vec, Address, Env, IntoVal, InvokeError, Val, Vec};

/// Wallet collaborator backed by the group's token contract. Calls are made
/// with `try_invoke_contract` so a failed transfer comes back as `false`
/// instead of trapping; the caller reconciles it in the ledger.
pub struct Wallet<'a> {
    env: &'a Env,
    token: &'a Address,
}

impl<'a> Wallet<'a> {
    pub fn new(env: &'a Env, token: &'a Address) -> Self {
        Wallet { env, token }
    }

    /// Pull `amount` from the member into escrow.
    pub fn debit(&self, member: &Address, amount: i128) -> bool {
        self.transfer(member, &self.env.current_contract_address(), amount)
    }

    /// Pay `amount` out of escrow to the member.
    pub fn credit(&self, member: &Address, amount: i128) -> bool {
        self.transfer(&self.env.current_contract_address(), member, amount)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: i128) -> bool {
        let args: Vec<Val> = vec![
            self.env,
            from.clone().into_val(self.env),
            to.clone().into_val(self.env),
            amount.into_val(self.env),
        ];
        self.env
            .try_invoke_contract::<(), InvokeError>(self.token, &symbol_short!("transfer"), args)
            .is_ok()
    }
}
