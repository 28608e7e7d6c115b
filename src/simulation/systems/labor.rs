//! Phase 2: production, payroll and the job market

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{CompanyId, PersonId};
use crate::economy::market::{Side, TraderId};
use crate::simulation::world::World;

pub fn run_labor(world: &mut World) {
    produce_and_pay(world);
    job_market(world);
}

/// Every staffed company produces its best product, lists it and pays wages
fn produce_and_pay(world: &mut World) {
    let economy = world.config.economy.clone();
    let ids: Vec<CompanyId> = world.companies.keys().copied().collect();

    for id in ids {
        let World {
            companies,
            people,
            market,
            ..
        } = &mut *world;
        let Some(company) = companies.get_mut(&id) else {
            continue;
        };
        if company.employees.is_empty() {
            continue;
        }

        company.recompute_knowledge(people);

        if let Some(product) = company.best_product(market, economy.max_product) {
            let capacity = company.employees.len() as f64 * economy.capacity_per_employee;
            let produced = company.produce(product, capacity, economy.entropy_loss);
            if produced > 0.0 {
                let listed = company.withdraw(product, produced);
                let price = market.get_price(product) * economy.sell_markup;
                market.place_order(product, Side::Ask, listed, price, TraderId::Company(id));
            }
        }

        if !company.pay_salaries(people) {
            world.dissolve_company(id);
        }
    }
}

/// Unemployed adults found companies or look for work
fn job_market(world: &mut World) {
    let economy = world.config.economy.clone();
    let working_age = world.config.life.working_age();

    let seekers: Vec<PersonId> = world
        .living()
        .filter(|p| p.age >= working_age && p.employer.is_none())
        .map(|p| p.id)
        .take(economy.job_seekers_per_day)
        .collect();

    for id in seekers {
        let Some(resources) = world.people.get(&id).map(|p| p.resources) else {
            continue;
        };

        if resources > economy.founding_wealth && world.rng.gen::<f64>() < economy.founding_chance {
            world.found_company(id);
            continue;
        }
        if world.companies.is_empty() {
            continue;
        }

        let all: Vec<CompanyId> = world.companies.keys().copied().collect();
        let sampled: Vec<CompanyId> = all
            .choose_multiple(&mut world.rng, economy.companies_sampled.min(all.len()))
            .copied()
            .collect();

        for company_id in sampled {
            let offer = match (world.companies.get(&company_id), world.people.get(&id)) {
                (Some(company), Some(person)) if !company.is_full(economy.max_employees) => {
                    let gap = company.knowledge_gap(person);
                    let salary = gap as f64 * economy.salary_per_gap;
                    (gap > 0 && company.capital > salary * economy.salary_horizon_days)
                        .then_some(salary)
                }
                _ => None,
            };

            if let Some(salary) = offer {
                world.hire(company_id, id, salary);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::years;
    use crate::core::SimulationConfig;

    fn world() -> World {
        let mut config = SimulationConfig::default();
        config.world.initial_population = 0;
        World::empty(config).unwrap()
    }

    #[test]
    fn test_company_lists_its_production() {
        let mut world = world();
        let founder = world.create_person(years(30), 10_000.0);
        let company = world.found_company(founder).unwrap();

        produce_and_pay(&mut world);

        let company = &world.companies[&company];
        assert!(company.capital < 5_000.0);
        assert!(company.inventory.values().all(|&q| q == 0.0) || company.inventory.is_empty());
        let book = world.market.book(2).unwrap();
        assert_eq!(book.ask_count(), 1);
    }

    #[test]
    fn test_seeker_hired_for_knowledge_gap() {
        let mut world = world();
        let founder = world.create_person(years(30), 10_000.0);
        let company = world.found_company(founder).unwrap();

        let seeker = world.create_person(years(25), 10.0);
        if let Some(p) = world.people.get_mut(&seeker) {
            p.known = [2, 3, 5].into_iter().collect();
        }

        job_market(&mut world);

        assert_eq!(world.people[&seeker].employer, Some(company));
        assert_eq!(world.people[&seeker].salary, 20.0);
        assert!(world.companies[&company].can_produce(5));
    }

    #[test]
    fn test_children_do_not_seek_work() {
        let mut world = world();
        let founder = world.create_person(years(30), 10_000.0);
        world.found_company(founder).unwrap();

        let child = world.create_person(years(10), 10.0);
        if let Some(p) = world.people.get_mut(&child) {
            p.known = [2, 3, 5].into_iter().collect();
        }

        job_market(&mut world);
        assert_eq!(world.people[&child].employer, None);
    }

    #[test]
    fn test_unpaid_company_is_dissolved() {
        let mut world = world();
        let founder = world.create_person(years(30), 10_000.0);
        let company = world.found_company(founder).unwrap();
        let worker = world.create_person(years(30), 0.0);
        world.hire(company, worker, 1_000_000.0);

        produce_and_pay(&mut world);

        assert!(!world.companies.contains_key(&company));
        assert_eq!(world.people[&worker].employer, None);
        assert_eq!(world.stats.companies_failed, 1);
        assert!(world.check_invariants().is_ok());
    }
}
