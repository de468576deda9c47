use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use engine::{
    CASH_ACCOUNT_ID, CcItemInput, DEFAULT_ACCOUNTS, DebtEdit, Document, EngineError, FixedClock,
    InstallmentEdit, Ledger, LedgerWarning, MemoryStorage, Money, NewDebt, NewInstallment,
    NewReceivable, OTHER, PaymentCmd, ReceivableEdit, ReceivableKind, SetupAccount, SetupCmd,
    SourceKind, SourceRef, TransactionInput, TransactionKind, TransferCmd,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn fresh_ledger() -> Ledger<MemoryStorage> {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap());
    let (ledger, report) = Ledger::builder(MemoryStorage::new())
        .clock(clock)
        .load_or_initialize()
        .unwrap();
    assert!(!report.found);
    ledger
}

fn lkr(major: f64) -> Money {
    Money::from_major(major)
}

fn balance(ledger: &Ledger<MemoryStorage>, account: &str) -> Money {
    ledger.state().account(account).unwrap().balance
}

fn fund(ledger: &mut Ledger<MemoryStorage>, account: &str, major: f64) {
    ledger
        .add_transaction(TransactionInput::income(lkr(major), account, "Salary", today()))
        .unwrap();
}

/// Checks every document invariant.
fn assert_invariants(doc: &Document) {
    for (id, _) in DEFAULT_ACCOUNTS {
        assert!(doc.account(id).is_ok(), "default account {id} missing");
    }
    for tx in &doc.transactions {
        assert!(doc.account(&tx.account).is_ok(), "dangling account {}", tx.account);
        assert!(tx.amount.is_positive());
        match tx.kind {
            TransactionKind::Expense => assert!(tx.category.is_some()),
            TransactionKind::Income => assert!(tx.category.is_none()),
        }
    }
    for debt in &doc.debts {
        assert!(debt.remaining_amount.is_positive());
        assert!(debt.remaining_amount <= debt.original_amount);
    }
    for receivable in &doc.receivables {
        assert!(receivable.remaining_amount.is_positive());
        assert!(receivable.remaining_amount <= receivable.original_amount);
        if receivable.kind == ReceivableKind::Cash {
            let source = receivable.source_account.as_deref().unwrap();
            assert!(doc.account(source).is_ok());
        }
    }
    for plan in &doc.installments {
        assert!(plan.months_left >= 1 && plan.months_left <= plan.total_months);
    }
    for item in &doc.credit_card.transactions {
        assert!(!item.paid_amount.is_negative() && item.paid_amount <= item.amount);
        assert_eq!(item.paid_off, item.paid_amount == item.amount);
    }
    assert!(doc.categories.iter().any(|c| c == OTHER));
}

#[test]
fn expense_without_funds_commits_with_warning() {
    let mut ledger = fresh_ledger();

    let receipt = ledger
        .add_transaction(TransactionInput::expense(
            lkr(1500.0),
            CASH_ACCOUNT_ID,
            "Food & Dining",
            "Lunch",
            today(),
        ))
        .unwrap();

    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(-1500.0));
    assert_eq!(
        receipt.warnings,
        vec![LedgerWarning::InsufficientFunds {
            account: "Cash".to_string(),
            balance: Money::ZERO,
            amount: lkr(1500.0),
        }]
    );
    let tx = ledger.state().transaction(&receipt.value).unwrap();
    assert_eq!(tx.category.as_deref(), Some("Food & Dining"));
    assert_invariants(ledger.state());
}

#[test]
fn add_transaction_moves_balance_by_rounded_amount() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, "bank_1", 100.0);

    ledger
        .add_transaction(TransactionInput::expense(
            lkr(10.004),
            "bank_1",
            "groceries",
            "Milk",
            today(),
        ))
        .unwrap();

    assert_eq!(balance(&ledger, "bank_1"), lkr(90.0));
    let milk = ledger.state().transactions.last().unwrap();
    assert_eq!(milk.category.as_deref(), Some("Groceries"));
}

#[test]
fn add_transaction_rejections_leave_state_untouched() {
    let mut ledger = fresh_ledger();
    let before = ledger.state().clone();

    let zero = TransactionInput::income(Money::ZERO, CASH_ACCOUNT_ID, "Gift", today());
    assert!(matches!(
        ledger.add_transaction(zero),
        Err(EngineError::Validation(_))
    ));

    let blank = TransactionInput::income(lkr(5.0), CASH_ACCOUNT_ID, "   ", today());
    assert_eq!(
        ledger.add_transaction(blank).unwrap_err(),
        EngineError::Validation("description must not be empty".to_string())
    );

    let unknown = TransactionInput::income(lkr(5.0), "bank_42", "Gift", today());
    assert_eq!(
        ledger.add_transaction(unknown).unwrap_err(),
        EngineError::NotFound("account bank_42".to_string())
    );

    let mut no_category =
        TransactionInput::expense(lkr(5.0), CASH_ACCOUNT_ID, "x", "Snack", today());
    no_category.category = None;
    assert!(matches!(
        ledger.add_transaction(no_category),
        Err(EngineError::Validation(_))
    ));

    assert_eq!(ledger.state(), &before);
}

#[test]
fn edit_transaction_moves_effect_between_accounts() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 500.0);
    let id = ledger
        .add_transaction(TransactionInput::expense(
            lkr(200.0),
            CASH_ACCOUNT_ID,
            "Shopping",
            "Shirt",
            today(),
        ))
        .unwrap()
        .value;
    let timestamp = ledger.state().transaction(&id).unwrap().timestamp;

    let receipt = ledger
        .edit_transaction(
            &id,
            TransactionInput::expense(lkr(50.0), "bank_2", "Shopping", "Socks", today()),
        )
        .unwrap();

    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(500.0));
    assert_eq!(balance(&ledger, "bank_2"), lkr(-50.0));
    assert!(matches!(
        receipt.warnings.as_slice(),
        [LedgerWarning::NegativeBalance { .. }]
    ));
    let tx = ledger.state().transaction(&id).unwrap();
    assert_eq!(tx.description, "Socks");
    assert_eq!(tx.timestamp, timestamp);
}

#[test]
fn edit_transaction_to_missing_account_is_all_or_nothing() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 80.0);
    let id = ledger.state().transactions[0].id.clone();
    let before = ledger.state().clone();

    let err = ledger
        .edit_transaction(
            &id,
            TransactionInput::income(lkr(90.0), "nowhere", "Salary", today()),
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(ledger.state(), &before);
}

#[test]
fn delete_transaction_reverts_effect() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, "bank_3", 70.0);
    let id = ledger.state().transactions[0].id.clone();

    ledger.delete_transaction(&id).unwrap();

    assert_eq!(balance(&ledger, "bank_3"), Money::ZERO);
    assert!(ledger.state().transactions.is_empty());
    assert!(matches!(
        ledger.delete_transaction(&id),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn transfer_conserves_total() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 250.0);
    let total = balance(&ledger, CASH_ACCOUNT_ID) + balance(&ledger, "bank_1");

    ledger
        .transfer(TransferCmd::new(CASH_ACCOUNT_ID, "bank_1", lkr(99.99)))
        .unwrap();

    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(150.01));
    assert_eq!(balance(&ledger, "bank_1"), lkr(99.99));
    assert_eq!(
        balance(&ledger, CASH_ACCOUNT_ID) + balance(&ledger, "bank_1"),
        total
    );
    assert_eq!(ledger.state().transactions.len(), 1);
}

#[test]
fn transfer_without_funds_is_rejected_unchanged() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 50.0);
    let snapshot = ledger.export_snapshot().unwrap();
    let stored = ledger.storage().get(ledger.storage_key()).unwrap().to_vec();

    let err = ledger
        .transfer(TransferCmd::new(CASH_ACCOUNT_ID, "bank_1", lkr(100.0)))
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(ledger.export_snapshot().unwrap(), snapshot);
    assert_eq!(ledger.storage().get(ledger.storage_key()).unwrap(), stored);
}

#[test]
fn transfer_to_same_account_is_rejected() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 50.0);

    assert_eq!(
        ledger
            .transfer(TransferCmd::new(CASH_ACCOUNT_ID, CASH_ACCOUNT_ID, lkr(1.0)))
            .unwrap_err(),
        EngineError::Validation("cannot transfer to the same account".to_string())
    );
}

#[test]
fn debt_is_paid_in_two_steps_then_removed() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 2000.0);
    let debt_id = ledger
        .add_debt(NewDebt::new("Sam", "Rent", lkr(1000.0), today()))
        .unwrap()
        .value;

    let first = ledger
        .pay_debt(&debt_id, PaymentCmd::new(lkr(500.0), CASH_ACCOUNT_ID))
        .unwrap()
        .value;
    assert_eq!(first.remaining, lkr(500.0));
    assert!(!first.settled);
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(1500.0));
    assert_eq!(ledger.state().debt(&debt_id).unwrap().remaining_amount, lkr(500.0));

    let second = ledger
        .pay_debt(&debt_id, PaymentCmd::new(lkr(500.0), CASH_ACCOUNT_ID))
        .unwrap()
        .value;
    assert!(second.settled);
    assert!(ledger.state().debts.is_empty());
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(1000.0));
    assert_invariants(ledger.state());
}

#[test]
fn debt_payment_can_be_logged_as_expense() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, "bank_1", 300.0);
    let debt_id = ledger
        .add_debt(NewDebt::new("Sam", "Rent", lkr(1000.0), today()))
        .unwrap()
        .value;

    let outcome = ledger
        .pay_debt(
            &debt_id,
            PaymentCmd::new(lkr(120.0), "bank_1").log_as_expense("Bank Charges"),
        )
        .unwrap()
        .value;

    let tx = ledger
        .state()
        .transaction(outcome.transaction_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Expense);
    assert_eq!(tx.amount, lkr(120.0));
    assert_eq!(tx.description, "Debt Payment: Sam - Rent");
    assert_eq!(tx.date, today());
    assert_eq!(tx.source_ref, Some(SourceRef::new(SourceKind::Debt, &debt_id)));
    // The logged expense does not debit the account a second time.
    assert_eq!(balance(&ledger, "bank_1"), lkr(180.0));
}

#[test]
fn debt_payment_rejections() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 100.0);
    let debt_id = ledger
        .add_debt(NewDebt::new("Sam", "Rent", lkr(50.0), today()))
        .unwrap()
        .value;
    let before = ledger.state().clone();

    let too_much = ledger.pay_debt(&debt_id, PaymentCmd::new(lkr(50.01), CASH_ACCOUNT_ID));
    assert!(matches!(too_much, Err(EngineError::Validation(_))));

    let poor = ledger.pay_debt(&debt_id, PaymentCmd::new(lkr(20.0), "bank_1"));
    assert!(matches!(poor, Err(EngineError::InsufficientFunds(_))));

    let bad_category = ledger.pay_debt(
        &debt_id,
        PaymentCmd::new(lkr(20.0), CASH_ACCOUNT_ID).log_as_expense("Yachts"),
    );
    assert!(matches!(bad_category, Err(EngineError::NotFound(_))));

    assert_eq!(ledger.state(), &before);
}

#[test]
fn repeated_payments_approach_zero_monotonically() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1000.0);
    let debt_id = ledger
        .add_debt(NewDebt::new("Kim", "Bike", lkr(100.0), today()))
        .unwrap()
        .value;

    let mut last = lkr(100.0);
    let mut payments = 0;
    while ledger.state().debt(&debt_id).is_ok() {
        let amount = lkr(33.33).min(last);
        let outcome = ledger
            .pay_debt(&debt_id, PaymentCmd::new(amount, CASH_ACCOUNT_ID))
            .unwrap()
            .value;
        assert!(outcome.remaining < last);
        last = outcome.remaining;
        payments += 1;
        assert_invariants(ledger.state());
    }
    assert_eq!(payments, 4);
    assert_eq!(last, Money::ZERO);
}

#[test]
fn edit_and_delete_debt() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 100.0);
    let debt_id = ledger
        .add_debt(NewDebt::new("Sam", "Rent", lkr(100.0), today()))
        .unwrap()
        .value;
    ledger
        .pay_debt(&debt_id, PaymentCmd::new(lkr(40.0), CASH_ACCOUNT_ID))
        .unwrap();

    let bad = DebtEdit {
        who: "Sam".to_string(),
        why: "Rent".to_string(),
        original_amount: lkr(100.0),
        remaining_amount: lkr(150.0),
        due_date: today(),
    };
    assert!(matches!(
        ledger.edit_debt(&debt_id, bad),
        Err(EngineError::Validation(_))
    ));

    let good = DebtEdit {
        who: "Samuel".to_string(),
        why: "Rent".to_string(),
        original_amount: lkr(120.0),
        remaining_amount: lkr(80.0),
        due_date: today(),
    };
    ledger.edit_debt(&debt_id, good).unwrap();
    let debt = ledger.state().debt(&debt_id).unwrap();
    assert_eq!(debt.who, "Samuel");
    assert_eq!(debt.remaining_amount, lkr(80.0));

    let receipt = ledger.delete_debt(&debt_id).unwrap();
    assert_eq!(
        receipt.warnings,
        vec![LedgerWarning::EffectNotReversed {
            record: SourceKind::Debt,
            id: debt_id.clone(),
            amount: lkr(40.0),
        }]
    );
    assert!(ledger.state().debts.is_empty());
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(60.0));
}

#[test]
fn cash_receivable_overpaid_logs_extra_income() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1000.0);
    let receivable_id = ledger
        .add_receivable(NewReceivable::cash(
            "Ann",
            "Loan",
            lkr(300.0),
            today(),
            CASH_ACCOUNT_ID,
        ))
        .unwrap()
        .value;
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(700.0));

    let outcome = ledger
        .receive_payment(&receivable_id, lkr(400.0), CASH_ACCOUNT_ID)
        .unwrap()
        .value;

    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(1100.0));
    assert!(outcome.settled);
    assert!(ledger.state().receivables.is_empty());
    let extra = ledger
        .state()
        .transaction(outcome.transaction_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(extra.kind, TransactionKind::Income);
    assert_eq!(extra.amount, lkr(100.0));
    assert_eq!(extra.category, None);
    assert_eq!(extra.description, "Ann Paid Back Extra");
    assert_invariants(ledger.state());
}

#[test]
fn partial_receipt_reduces_remaining() {
    let mut ledger = fresh_ledger();
    let receivable_id = ledger
        .add_receivable(NewReceivable::cc("Ann", "Concert", lkr(90.0), today()))
        .unwrap()
        .value;
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), Money::ZERO);

    let outcome = ledger
        .receive_payment(&receivable_id, lkr(30.0), "bank_2")
        .unwrap()
        .value;

    assert_eq!(outcome.remaining, lkr(60.0));
    assert_eq!(outcome.transaction_id, None);
    assert_eq!(balance(&ledger, "bank_2"), lkr(30.0));
    assert_eq!(
        ledger.state().receivable(&receivable_id).unwrap().remaining_amount,
        lkr(60.0)
    );
}

#[test]
fn cash_receivable_needs_covered_source() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 10.0);
    let before = ledger.state().clone();

    let poor = ledger.add_receivable(NewReceivable::cash(
        "Ann",
        "Loan",
        lkr(300.0),
        today(),
        CASH_ACCOUNT_ID,
    ));
    assert!(matches!(poor, Err(EngineError::InsufficientFunds(_))));

    let mut no_source = NewReceivable::cash("Ann", "Loan", lkr(1.0), today(), "x");
    no_source.source_account = None;
    assert!(matches!(
        ledger.add_receivable(no_source),
        Err(EngineError::Validation(_))
    ));
    assert_eq!(ledger.state(), &before);
}

#[test]
fn edit_receivable_moves_cash_debit() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 500.0);
    fund(&mut ledger, "bank_1", 100.0);
    let receivable_id = ledger
        .add_receivable(NewReceivable::cash(
            "Ann",
            "Loan",
            lkr(400.0),
            today(),
            CASH_ACCOUNT_ID,
        ))
        .unwrap()
        .value;

    let edit = |amount: f64, kind, source: Option<&str>| ReceivableEdit {
        who: "Ann".to_string(),
        why: "Loan".to_string(),
        original_amount: lkr(amount),
        remaining_amount: lkr(amount),
        date_given: today(),
        kind,
        source_account: source.map(ToString::to_string),
    };

    // bank_1 cannot cover 150 even though cash gets its 400 back.
    let before = ledger.state().clone();
    let err = ledger
        .edit_receivable(&receivable_id, edit(150.0, ReceivableKind::Cash, Some("bank_1")))
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(ledger.state(), &before);

    ledger
        .edit_receivable(&receivable_id, edit(80.0, ReceivableKind::Cash, Some("bank_1")))
        .unwrap();
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(500.0));
    assert_eq!(balance(&ledger, "bank_1"), lkr(20.0));

    ledger
        .edit_receivable(&receivable_id, edit(80.0, ReceivableKind::Cc, None))
        .unwrap();
    assert_eq!(balance(&ledger, "bank_1"), lkr(100.0));
    assert_eq!(
        ledger.state().receivable(&receivable_id).unwrap().kind,
        ReceivableKind::Cc
    );
}

#[test]
fn deleting_cash_receivable_keeps_debit() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 500.0);
    let receivable_id = ledger
        .add_receivable(NewReceivable::cash(
            "Ann",
            "Loan",
            lkr(200.0),
            today(),
            CASH_ACCOUNT_ID,
        ))
        .unwrap()
        .value;

    let receipt = ledger.delete_receivable(&receivable_id).unwrap();

    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(300.0));
    assert!(matches!(
        receipt.warnings.as_slice(),
        [LedgerWarning::EffectNotReversed {
            record: SourceKind::Receivable,
            ..
        }]
    ));
}

#[test]
fn advancing_installment_moves_no_money() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 100.0);
    let plan_id = ledger
        .add_installment(NewInstallment::new("Phone", lkr(1000.0), 3, today()))
        .unwrap()
        .value;
    let plan = ledger.state().installment(&plan_id).unwrap();
    assert_eq!(plan.monthly_amount, lkr(333.33));
    assert_eq!(plan.months_left, 3);
    let snapshot_accounts = ledger.state().accounts.clone();
    let tx_count = ledger.state().transactions.len();

    assert_eq!(ledger.advance_installment_month(&plan_id).unwrap().value, 2);
    assert_eq!(ledger.advance_installment_month(&plan_id).unwrap().value, 1);
    assert_eq!(ledger.advance_installment_month(&plan_id).unwrap().value, 0);

    assert!(ledger.state().installments.is_empty());
    assert_eq!(ledger.state().accounts, snapshot_accounts);
    assert_eq!(ledger.state().transactions.len(), tx_count);
    assert!(matches!(
        ledger.advance_installment_month(&plan_id),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn installment_paid_as_expense() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, "bank_1", 1000.0);
    let plan_id = ledger
        .add_installment(NewInstallment::new("Laptop", lkr(600.0), 6, today()).months_left(2))
        .unwrap()
        .value;

    let outcome = ledger
        .pay_installment_as_expense(&plan_id, "bank_1", "Education")
        .unwrap()
        .value;

    assert_eq!(balance(&ledger, "bank_1"), lkr(900.0));
    assert_eq!(outcome.remaining, lkr(100.0));
    let tx = ledger
        .state()
        .transaction(outcome.transaction_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(tx.description, "Installment: Laptop (Month 5/6)");
    assert_eq!(tx.category.as_deref(), Some("Education"));
    assert_eq!(ledger.state().installment(&plan_id).unwrap().months_left, 1);

    let last = ledger
        .pay_installment_as_expense(&plan_id, "bank_1", "Education")
        .unwrap()
        .value;
    assert!(last.settled);
    assert!(ledger.state().installments.is_empty());

    let poor = ledger
        .add_installment(NewInstallment::new("Car", lkr(9000.0), 3, today()))
        .unwrap()
        .value;
    assert!(matches!(
        ledger.pay_installment_as_expense(&poor, CASH_ACCOUNT_ID, "Travel"),
        Err(EngineError::InsufficientFunds(_))
    ));
}

#[test]
fn installment_edit_validates_months() {
    let mut ledger = fresh_ledger();
    let plan_id = ledger
        .add_installment(NewInstallment::new("Sofa", lkr(500.0), 5, today()).months_left(9))
        .unwrap()
        .value;
    assert_eq!(ledger.state().installment(&plan_id).unwrap().months_left, 5);

    let edit = |months_left| InstallmentEdit {
        description: "Sofa".to_string(),
        full_amount: lkr(800.0),
        total_months: 4,
        months_left,
        start_date: today(),
    };
    assert!(matches!(
        ledger.edit_installment(&plan_id, edit(5)),
        Err(EngineError::Validation(_))
    ));

    ledger.edit_installment(&plan_id, edit(3)).unwrap();
    let plan = ledger.state().installment(&plan_id).unwrap();
    assert_eq!(plan.monthly_amount, lkr(200.0));
    assert_eq!(plan.total_months, 4);

    ledger.edit_installment(&plan_id, edit(0)).unwrap();
    assert!(ledger.state().installments.is_empty());
}

#[test]
fn installment_with_sub_cent_share_is_rejected() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 10.0);

    let err = ledger
        .add_installment(NewInstallment::new("Sticker", Money::new(1), 3, today()))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(ledger.state().installments.is_empty());

    let plan_id = ledger
        .add_installment(NewInstallment::new("Sticker", Money::new(3), 3, today()))
        .unwrap()
        .value;
    let err = ledger
        .edit_installment(
            &plan_id,
            InstallmentEdit {
                description: "Sticker".to_string(),
                full_amount: Money::new(1),
                total_months: 3,
                months_left: 3,
                start_date: today(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let outcome = ledger
        .pay_installment_as_expense(&plan_id, CASH_ACCOUNT_ID, OTHER)
        .unwrap()
        .value;
    let logged = ledger
        .state()
        .transaction(&outcome.transaction_id.unwrap())
        .unwrap();
    assert_eq!(logged.amount, Money::new(1));
    assert_invariants(ledger.state());
}

#[test]
fn balance_overflow_is_rejected() {
    let mut ledger = fresh_ledger();

    let err = ledger
        .set_account_balance(CASH_ACCOUNT_ID, Money::new(i64::MAX))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    ledger
        .set_account_balance(CASH_ACCOUNT_ID, Money::MAX)
        .unwrap();
    ledger.set_account_balance("bank_1", lkr(1.0)).unwrap();
    let before = ledger.export_snapshot().unwrap();

    let err = ledger
        .add_transaction(TransactionInput::income(lkr(0.01), CASH_ACCOUNT_ID, "Tip", today()))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = ledger
        .transfer(TransferCmd::new("bank_1", CASH_ACCOUNT_ID, lkr(0.01)))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(ledger.export_snapshot().unwrap(), before);

    ledger
        .add_transaction(TransactionInput::expense(
            lkr(0.01),
            CASH_ACCOUNT_ID,
            OTHER,
            "Gum",
            today(),
        ))
        .unwrap();
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), Money::new(Money::MAX.cents() - 1));
}

#[test]
fn cc_item_payment_lifecycle() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1000.0);
    ledger.set_credit_limit(lkr(5000.0)).unwrap();
    let item_id = ledger
        .add_cc_item(CcItemInput::new(lkr(250.0), "Headphones", today()))
        .unwrap()
        .value;
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(1000.0));

    let partial = ledger
        .pay_cc_item(
            &item_id,
            PaymentCmd::new(lkr(100.0), CASH_ACCOUNT_ID).log_as_expense("Shopping"),
        )
        .unwrap()
        .value;
    assert_eq!(partial.remaining, lkr(150.0));
    assert!(!partial.settled);
    let logged = ledger
        .state()
        .transaction(partial.transaction_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(logged.description, "Credit Card Payment: Headphones");

    let full = ledger
        .pay_cc_item(&item_id, PaymentCmd::new(lkr(150.0), CASH_ACCOUNT_ID))
        .unwrap()
        .value;
    assert!(full.settled);
    let item = ledger.state().cc_item(&item_id).unwrap();
    assert!(item.paid_off);
    assert_eq!(item.paid_amount, lkr(250.0));
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), lkr(750.0));
    assert_eq!(ledger.state().credit_card.used(), Money::ZERO);

    assert!(matches!(
        ledger.pay_cc_item(&item_id, PaymentCmd::new(lkr(1.0), CASH_ACCOUNT_ID)),
        Err(EngineError::Validation(_))
    ));
    assert_invariants(ledger.state());
}

#[test]
fn cc_item_edit_caps_paid_amount() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1000.0);
    let item_id = ledger
        .add_cc_item(CcItemInput::new(lkr(300.0), "Jacket", today()))
        .unwrap()
        .value;
    ledger
        .pay_cc_item(&item_id, PaymentCmd::new(lkr(200.0), CASH_ACCOUNT_ID))
        .unwrap();

    ledger
        .edit_cc_item(&item_id, CcItemInput::new(lkr(150.0), "Jacket", today()))
        .unwrap();

    let item = ledger.state().cc_item(&item_id).unwrap();
    assert_eq!(item.paid_amount, lkr(150.0));
    assert!(item.paid_off);
}

#[test]
fn deleting_cc_item_removes_linked_expenses_only() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1000.0);
    let item_id = ledger
        .add_cc_item(CcItemInput::new(lkr(300.0), "TV", today()))
        .unwrap()
        .value;
    ledger
        .add_transaction(TransactionInput::expense(
            lkr(10.0),
            CASH_ACCOUNT_ID,
            "Other",
            "Credit Card Payment: TV stand",
            today(),
        ))
        .unwrap();
    ledger
        .pay_cc_item(
            &item_id,
            PaymentCmd::new(lkr(100.0), CASH_ACCOUNT_ID).log_as_expense("Shopping"),
        )
        .unwrap();
    let cash = balance(&ledger, CASH_ACCOUNT_ID);

    let receipt = ledger.delete_cc_item(&item_id).unwrap();

    assert_eq!(receipt.value, 1);
    assert_eq!(balance(&ledger, CASH_ACCOUNT_ID), cash);
    assert!(ledger.state().credit_card.transactions.is_empty());
    // Income plus the unrelated expense with a similar description.
    assert_eq!(ledger.state().transactions.len(), 2);
}

#[test]
fn category_rules() {
    let mut ledger = fresh_ledger();
    ledger.add_category("  Pets ").unwrap();
    assert!(matches!(
        ledger.add_category("pets"),
        Err(EngineError::Validation(_))
    ));

    ledger
        .add_transaction(TransactionInput::expense(
            lkr(5.0),
            CASH_ACCOUNT_ID,
            "Pets",
            "Kibble",
            today(),
        ))
        .unwrap();

    assert!(matches!(
        ledger.delete_category("Pets"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        ledger.delete_category(OTHER),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        ledger.rename_category(OTHER, "Misc"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        ledger.rename_category("Pets", "travel"),
        Err(EngineError::Validation(_))
    ));

    let moved = ledger.rename_category("pets", "Animals").unwrap().value;
    assert_eq!(moved, 1);
    let categories = &ledger.state().categories;
    assert!(categories.iter().any(|c| c == "Animals"));
    assert!(!categories.iter().any(|c| c == "Pets"));
    assert_eq!(categories[0], "Animals");
    assert_eq!(
        ledger.state().transactions[0].category.as_deref(),
        Some("Animals")
    );

    ledger.add_category("Hobbies").unwrap();
    ledger.delete_category("hobbies").unwrap();
    assert!(matches!(
        ledger.delete_category("Hobbies"),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn account_rename_and_balance_correction() {
    let mut ledger = fresh_ledger();

    ledger.rename_account("bank_1", "Sampath").unwrap();
    assert_eq!(ledger.state().account("bank_1").unwrap().name, "Sampath");
    assert!(matches!(
        ledger.rename_account(CASH_ACCOUNT_ID, "Wallet"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        ledger.rename_account("bank_2", "sampath"),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        ledger.rename_account("bank_2", " "),
        Err(EngineError::Validation(_))
    ));

    ledger.set_account_balance("bank_2", lkr(42.5)).unwrap();
    assert_eq!(balance(&ledger, "bank_2"), lkr(42.5));
    assert!(ledger.state().settings.initial_setup_done);
}

#[test]
fn initial_setup_runs_once() {
    let mut ledger = fresh_ledger();
    let cmd = SetupCmd::default()
        .account(SetupAccount::new(CASH_ACCOUNT_ID, lkr(1200.0)).name("Pocket"))
        .account(SetupAccount::new("bank_1", lkr(50_000.0)).name("Sampath"))
        .account(SetupAccount::new("bank_2", Money::ZERO).name("  "))
        .cc_limit(lkr(-10.0))
        .categories(["Rent", "rent", "Fuel", ""]);

    ledger.complete_setup(cmd.clone()).unwrap();

    let doc = ledger.state();
    assert_eq!(doc.account(CASH_ACCOUNT_ID).unwrap().name, "Cash");
    assert_eq!(doc.account(CASH_ACCOUNT_ID).unwrap().balance, lkr(1200.0));
    assert_eq!(doc.account("bank_1").unwrap().name, "Sampath");
    assert_eq!(doc.account("bank_2").unwrap().name, "HNB");
    assert_eq!(doc.categories, vec!["Fuel", "Other", "Rent"]);
    assert_eq!(doc.credit_card.limit, Money::ZERO);
    assert!(doc.settings.show_cc_dashboard_section);
    assert!(doc.settings.initial_setup_done);

    assert!(matches!(
        ledger.complete_setup(cmd),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn settings_toggles() {
    let mut ledger = fresh_ledger();
    ledger.set_show_cc_dashboard_section(false).unwrap();
    ledger.set_theme("light").unwrap();
    assert!(!ledger.state().settings.show_cc_dashboard_section);
    assert_eq!(ledger.state().settings.theme, "light");
    assert!(ledger.set_theme("").is_err());
}

#[test]
fn invariants_hold_across_a_mixed_session() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 5000.0);
    fund(&mut ledger, "bank_1", 2500.0);
    assert_invariants(ledger.state());

    let debt = ledger
        .add_debt(NewDebt::new("Bank", "Loan", lkr(1000.0), today()))
        .unwrap()
        .value;
    let receivable = ledger
        .add_receivable(NewReceivable::cash("Lee", "Trip", lkr(250.0), today(), "bank_1"))
        .unwrap()
        .value;
    let plan = ledger
        .add_installment(NewInstallment::new("TV", lkr(999.99), 7, today()))
        .unwrap()
        .value;
    let item = ledger
        .add_cc_item(CcItemInput::new(lkr(75.5), "Books", today()))
        .unwrap()
        .value;
    assert_invariants(ledger.state());

    ledger
        .pay_debt(&debt, PaymentCmd::new(lkr(333.33), CASH_ACCOUNT_ID))
        .unwrap();
    assert_invariants(ledger.state());
    ledger
        .receive_payment(&receivable, lkr(100.0), "bank_2")
        .unwrap();
    assert_invariants(ledger.state());
    ledger.advance_installment_month(&plan).unwrap();
    assert_invariants(ledger.state());
    ledger
        .pay_cc_item(&item, PaymentCmd::new(lkr(75.5), "bank_1"))
        .unwrap();
    assert_invariants(ledger.state());
    ledger
        .transfer(TransferCmd::new("bank_1", "bank_3", lkr(10.0)))
        .unwrap();
    assert_invariants(ledger.state());

    let _ = ledger.transfer(TransferCmd::new("bank_3", "bank_1", lkr(1e9)));
    let _ = ledger.pay_debt(&debt, PaymentCmd::new(lkr(1e6), CASH_ACCOUNT_ID));
    assert_invariants(ledger.state());
}

#[test]
fn new_records_get_increasing_timestamps() {
    let mut ledger = fresh_ledger();
    fund(&mut ledger, CASH_ACCOUNT_ID, 1.0);
    fund(&mut ledger, CASH_ACCOUNT_ID, 2.0);
    ledger
        .add_debt(NewDebt::new("A", "B", lkr(1.0), today()))
        .unwrap();

    let doc = ledger.state();
    let stamps = [
        doc.transactions[0].timestamp,
        doc.transactions[1].timestamp,
        doc.debts[0].timestamp,
    ];
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(
        doc.transactions_newest_first()[0].id,
        doc.transactions[1].id
    );
}
