//! Phase 3: food purchases and the base commodity supply

use crate::economy::market::{Market, Side, TraderId};
use crate::economy::valuation;
use crate::entity::Person;
use crate::simulation::world::World;

/// Base commodity produced from nothing every day
pub const BASE_COMMODITY: u64 = 1;

pub fn run_market(world: &mut World) {
    buy_food(world);
    supply_base_commodity(world);
}

/// Most nutrition per unit of price among affordable candidates
fn best_food(person: &Person, market: &Market, max_candidate: u64) -> Option<u64> {
    let mut best = None;
    let mut best_value = 0.0;

    for n in 1..max_candidate {
        let nutrition = valuation::nutrition(n) as f64;
        let price = market.get_price(n);
        if nutrition <= 0.0 || price <= 0.0 || price > person.resources {
            continue;
        }
        let value = nutrition / price;
        if value > best_value {
            best_value = value;
            best = Some(n);
        }
    }
    best
}

/// Hungry individuals bid for food and eat part of it at once
fn buy_food(world: &mut World) {
    let World {
        people,
        market,
        config,
        ..
    } = &mut *world;
    let config = &*config;
    let economy = &config.economy;

    for person in people.values_mut() {
        if !person.alive {
            continue;
        }
        let need = config.needs.nutrition_requirement - person.nutrition_level;
        if need <= 0.0 || person.resources <= 0.0 {
            continue;
        }

        let Some(food) = best_food(person, market, economy.max_food_candidate) else {
            continue;
        };

        let price = market.get_price(food);
        let quantity = (person.resources / price).min(economy.max_purchase_quantity);
        market.place_order(
            food,
            Side::Bid,
            quantity,
            price * economy.bid_discount,
            TraderId::Person(person.id),
        );

        let absorbed = valuation::nutrition(food) as f64 * quantity * economy.consumption_fraction;
        person.eat(absorbed, config);
        person.resources = (person.resources - price * quantity).max(0.0);
    }
}

/// Split the day's base commodity among companies, which list any surplus
fn supply_base_commodity(world: &mut World) {
    let produced = world.people.len() as f64 * world.config.needs.daily_one_production;
    if produced <= 0.0 || world.companies.is_empty() {
        return;
    }

    let economy = &world.config.economy;
    let share = produced / world.companies.len() as f64;

    for company in world.companies.values_mut() {
        *company.inventory.entry(BASE_COMMODITY).or_insert(0.0) += share;

        let stock = company.stock(BASE_COMMODITY);
        if stock > economy.one_listing_threshold {
            let listed = company.withdraw(BASE_COMMODITY, stock * 0.5);
            world.market.place_order(
                BASE_COMMODITY,
                Side::Ask,
                listed,
                economy.one_listing_price,
                TraderId::Company(company.id),
            );
        }
    }
}
