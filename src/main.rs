#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    payslip_generator_server::run().await
}
