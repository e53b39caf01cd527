//! Mapping between engine types and wire bodies.

use api_types::{
    Currency as ApiCurrency,
    account::{AccountType, AccountView},
    budget::BudgetView,
    category::{CategoryType, CategoryView},
    transaction::{AccountSummary, TransactionType, TransactionView},
    user::{Role, UserProfile},
};
use engine::{
    Account, AccountKind, Budget, Category, CategoryKind, Currency, TransactionKind,
    TransactionWithAccount, User, UserRole,
};

pub(crate) fn currency_from_api(currency: ApiCurrency) -> Currency {
    match currency {
        ApiCurrency::Inr => Currency::Inr,
        ApiCurrency::Eur => Currency::Eur,
        ApiCurrency::Usd => Currency::Usd,
        ApiCurrency::Gbp => Currency::Gbp,
    }
}

fn currency_to_api(currency: Currency) -> ApiCurrency {
    match currency {
        Currency::Inr => ApiCurrency::Inr,
        Currency::Eur => ApiCurrency::Eur,
        Currency::Usd => ApiCurrency::Usd,
        Currency::Gbp => ApiCurrency::Gbp,
    }
}

pub(crate) fn account_kind_from_api(kind: AccountType) -> AccountKind {
    match kind {
        AccountType::Savings => AccountKind::Savings,
        AccountType::Checking => AccountKind::Checking,
        AccountType::CreditCard => AccountKind::CreditCard,
        AccountType::Cash => AccountKind::Cash,
        AccountType::Investment => AccountKind::Investment,
    }
}

fn account_kind_to_api(kind: AccountKind) -> AccountType {
    match kind {
        AccountKind::Savings => AccountType::Savings,
        AccountKind::Checking => AccountType::Checking,
        AccountKind::CreditCard => AccountType::CreditCard,
        AccountKind::Cash => AccountType::Cash,
        AccountKind::Investment => AccountType::Investment,
    }
}

pub(crate) fn tx_kind_from_api(kind: TransactionType) -> TransactionKind {
    match kind {
        TransactionType::Income => TransactionKind::Income,
        TransactionType::Expense => TransactionKind::Expense,
        TransactionType::Transfer => TransactionKind::Transfer,
    }
}

fn tx_kind_to_api(kind: TransactionKind) -> TransactionType {
    match kind {
        TransactionKind::Income => TransactionType::Income,
        TransactionKind::Expense => TransactionType::Expense,
        TransactionKind::Transfer => TransactionType::Transfer,
    }
}

pub(crate) fn category_kind_from_api(kind: CategoryType) -> CategoryKind {
    match kind {
        CategoryType::Income => CategoryKind::Income,
        CategoryType::Expense => CategoryKind::Expense,
    }
}

pub(crate) fn user_profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: match user.role {
            UserRole::User => Role::User,
            UserRole::Admin => Role::Admin,
        },
        active: user.active,
        created_at: user.created_at,
    }
}

pub(crate) fn account_view(account: &Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name.clone(),
        kind: account_kind_to_api(account.kind),
        balance_minor: account.balance.cents(),
        currency: currency_to_api(account.currency),
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub(crate) fn transaction_view(item: TransactionWithAccount) -> TransactionView {
    let TransactionWithAccount {
        transaction: tx,
        account,
    } = item;
    TransactionView {
        id: tx.id,
        kind: tx_kind_to_api(tx.kind),
        amount_minor: tx.amount.cents(),
        category: tx.category,
        description: tx.description,
        transaction_date: tx.transaction_date,
        created_at: tx.created_at,
        account: AccountSummary {
            id: account.id,
            name: account.name,
            kind: account_kind_to_api(account.kind),
            balance_minor: account.balance.cents(),
        },
    }
}

pub(crate) fn budget_view(budget: &Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category.clone(),
        limit_minor: budget.limit.cents(),
        spent_minor: budget.spent.cents(),
        remaining_minor: budget.remaining().cents(),
        month: budget.period.to_string(),
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    }
}

pub(crate) fn category_view(category: &Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name.clone(),
        kind: match category.kind {
            CategoryKind::Income => CategoryType::Income,
            CategoryKind::Expense => CategoryType::Expense,
        },
        icon: category.icon.clone(),
        color: category.color.clone(),
    }
}
