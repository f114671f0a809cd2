//! Diesel schema for the bounty ledger.

diesel::table! {
    /// Spendable balances keyed by identity.
    ledger_accounts (owner) {
        /// Account identity bytes.
        owner -> Bytea,
        /// Spendable balance in lamports.
        balance -> Int8,
    }
}

diesel::table! {
    /// Board records keyed by derived address.
    boards (address) {
        /// Derived board address.
        address -> Bytea,
        /// Owning authority.
        authority -> Bytea,
        /// Number of tasks ever created.
        task_count -> Int8,
        /// Sum of every escrowed bounty.
        total_bounties -> Int8,
        /// Lamports locked into the record.
        reservation -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records keyed by derived address.
    tasks (address) {
        /// Derived task address.
        address -> Bytea,
        /// Owning board address.
        board -> Bytea,
        /// Index under the board.
        task_index -> Int8,
        /// Creator identity.
        creator -> Bytea,
        /// Claimer identity.
        claimer -> Nullable<Bytea>,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Task description.
        #[max_length = 500]
        description -> Varchar,
        /// Original bounty.
        bounty_amount -> Int8,
        /// Completion proof.
        #[max_length = 500]
        proof -> Nullable<Varchar>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Escrow balance still held.
        escrow_balance -> Int8,
        /// Identity credited by the escrow release.
        release_recipient -> Nullable<Bytea>,
        /// Amount disbursed by the escrow release.
        release_amount -> Nullable<Int8>,
        /// Escrow release direction.
        #[max_length = 20]
        release_kind -> Nullable<Varchar>,
        /// Lamports locked into the record.
        reservation -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> boards (board));
diesel::allow_tables_to_appear_in_same_query!(boards, tasks);
