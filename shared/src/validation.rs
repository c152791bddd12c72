//! Authoring-time validation
//!
//! Everything here runs before a write; a record that fails validation is
//! never partially persisted.

use rust_decimal::Decimal;

use crate::models::RecipeCard;

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a stock item or product name.
pub fn validate_item_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name must not be empty");
    }
    Ok(())
}

/// Validate a purchase or manual stock entry before it is recorded.
pub fn validate_stock_entry(name: &str, qty: Decimal, total: Decimal) -> Result<(), &'static str> {
    validate_item_name(name)?;
    if qty <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    if total <= Decimal::ZERO {
        return Err("Total must be positive");
    }
    Ok(())
}

/// A recipe must have a name and a real cost before it can be saved.
pub fn validate_recipe(card: &RecipeCard) -> Result<(), &'static str> {
    validate_item_name(&card.description)?;
    if card.total_cost <= Decimal::ZERO {
        return Err("Recipe cost must be positive");
    }
    Ok(())
}

/// A sale needs a positive quantity and a positive unit price.
pub fn validate_sale(qty: Decimal, unit_price: Decimal) -> Result<(), &'static str> {
    if qty <= Decimal::ZERO {
        return Err("Quantity sold must be positive");
    }
    if unit_price <= Decimal::ZERO {
        return Err("Sale price must be positive");
    }
    Ok(())
}

/// A waste event needs a positive quantity and a known reason.
pub fn validate_waste(qty: Decimal, reason: &str) -> Result<(), &'static str> {
    if qty <= Decimal::ZERO {
        return Err("Wasted quantity must be positive");
    }
    if !is_known_waste_reason(reason) {
        return Err("Unknown waste reason");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

// ============================================================================
// Waste Reason Catalog
// ============================================================================

/// Fixed taxonomy of waste reasons, `category - reason`. Clients submit
/// one of these labels; free-form reasons are rejected so the loss report
/// can group reliably.
pub const WASTE_REASONS: &[&str] = &[
    // Estoque / Armazenamento
    "Estoque / Armazenamento - Produto vencido",
    "Estoque / Armazenamento - Produto deteriorado",
    "Estoque / Armazenamento - Armazenamento inadequado (temp)",
    "Estoque / Armazenamento - Armazenamento inadequado (umidade/luz)",
    "Estoque / Armazenamento - Embalagem danificada",
    "Estoque / Armazenamento - Produto aberto sem uso",
    "Estoque / Armazenamento - Excesso de compra",
    "Estoque / Armazenamento - Praga no estoque",
    "Estoque / Armazenamento - Falha na organização (FIFO)",
    "Estoque / Armazenamento - Reprovado no recebimento",
    "Estoque / Armazenamento - Extraviado no estoque",
    "Estoque / Armazenamento - Queda no transporte interno",
    // Preparo / Cozinha
    "Preparo / Cozinha - Erro de manipulação",
    "Preparo / Cozinha - Erro de porcionamento",
    "Preparo / Cozinha - Erro de receita",
    "Preparo / Cozinha - Queima / cozimento excessivo",
    "Preparo / Cozinha - Sobra de preparo",
    "Preparo / Cozinha - Descarte de aparas úteis",
    "Preparo / Cozinha - Contaminação cruzada",
    "Preparo / Cozinha - Utensílio contaminado",
    "Preparo / Cozinha - Textura inadequada",
    "Preparo / Cozinha - Impróprio após reaquecer",
    // Serviço / Atendimento
    "Serviço / Atendimento - Sobra de buffet",
    "Serviço / Atendimento - Devolvido pelo cliente",
    "Serviço / Atendimento - Excesso de reposição",
    "Serviço / Atendimento - Exposto tempo excessivo",
    "Serviço / Atendimento - Erro no pedido",
    "Serviço / Atendimento - Apresentação inadequada",
    // Operacional / Infraestrutura
    "Operacional / Infraestrutura - Falha de refrigeração",
    "Operacional / Infraestrutura - Falha elétrica",
    "Operacional / Infraestrutura - Avaria no transporte",
    "Operacional / Infraestrutura - Quebra de vidro",
    "Operacional / Infraestrutura - Infiltração",
    "Operacional / Infraestrutura - Queda de estantes",
    "Operacional / Infraestrutura - Infestação",
    // Higiene / Segurança
    "Higiene / Segurança - Contaminação cruzada",
    "Higiene / Segurança - Sem EPI",
    "Higiene / Segurança - Exposto sem proteção",
    "Higiene / Segurança - Falha em boas práticas",
    "Higiene / Segurança - Rejeição visual/olfativa",
    "Higiene / Segurança - Superfície suja",
    "Higiene / Segurança - Temperatura insegura",
    // Gestão / Processos
    "Gestão / Processos - Inventário incorreto",
    "Gestão / Processos - Falha de comunicação",
    "Gestão / Processos - Compra inadequada",
    "Gestão / Processos - Cardápio mal planejado",
    "Gestão / Processos - Erro administrativo",
    "Gestão / Processos - Treinamento insuficiente",
];

/// Check a submitted reason against the catalog.
pub fn is_known_waste_reason(reason: &str) -> bool {
    WASTE_REASONS.contains(&reason)
        || WASTE_REASONS
            .iter()
            .any(|r| r.rsplit(" - ").next() == Some(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("LEITE INTEGRAL").is_ok());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name("").is_err());
    }

    #[test]
    fn test_validate_stock_entry() {
        assert!(validate_stock_entry("FARINHA", dec("1000"), dec("8.00")).is_ok());
        assert!(validate_stock_entry("FARINHA", dec("0"), dec("8.00")).is_err());
        assert!(validate_stock_entry("FARINHA", dec("1000"), dec("0")).is_err());
        assert!(validate_stock_entry("", dec("1000"), dec("8.00")).is_err());
    }

    #[test]
    fn test_validate_recipe_requires_cost() {
        let mut card = RecipeCard {
            description: "BOLO".into(),
            total_cost: dec("10"),
            ..Default::default()
        };
        assert!(validate_recipe(&card).is_ok());

        card.total_cost = Decimal::ZERO;
        assert!(validate_recipe(&card).is_err());

        card.total_cost = dec("10");
        card.description.clear();
        assert!(validate_recipe(&card).is_err());
    }

    #[test]
    fn test_validate_sale() {
        assert!(validate_sale(dec("2"), dec("7.20")).is_ok());
        assert!(validate_sale(dec("0"), dec("7.20")).is_err());
        assert!(validate_sale(dec("2"), dec("0")).is_err());
    }

    #[test]
    fn test_validate_waste_reason() {
        assert!(validate_waste(dec("1"), "Estoque / Armazenamento - Produto vencido").is_ok());
        assert!(validate_waste(dec("1"), "Produto vencido").is_ok());
        assert!(validate_waste(dec("1"), "porque sim").is_err());
        assert!(validate_waste(dec("0"), "Produto vencido").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }
}
