use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "docroute-cli")]
#[command(about = "Command-line client for a docroute service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a resource's fields, methods and URL templates
    Schema {
        /// Resource path, e.g. `widget` or `widget/<id>/gadget`
        resource: String,
    },
    /// List documents, optionally narrowed to one id
    List {
        resource: String,
        id: Option<String>,
    },
    /// Create a document from a JSON body
    Create { resource: String, body: String },
    /// Update the document with the given id
    Update {
        resource: String,
        id: String,
        body: String,
    },
    /// Delete the document with the given id
    Delete { resource: String, id: String },
}

fn endpoint(base: &str, resource: &str, id: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let resource = resource.trim_matches('/');
    match id {
        Some(id) => format!("{}/{}/{}", base, resource, id),
        None => format!("{}/{}", base, resource),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Schema { resource } => {
            client
                .get(format!("{}/schema", endpoint(&cli.url, &resource, None)))
                .send()
                .await?
        }
        Commands::List { resource, id } => {
            client
                .get(endpoint(&cli.url, &resource, id.as_deref()))
                .send()
                .await?
        }
        Commands::Create { resource, body } => {
            let body: Value = serde_json::from_str(&body)?;
            client
                .post(endpoint(&cli.url, &resource, None))
                .json(&body)
                .send()
                .await?
        }
        Commands::Update { resource, id, body } => {
            let body: Value = serde_json::from_str(&body)?;
            client
                .put(endpoint(&cli.url, &resource, Some(&id)))
                .json(&body)
                .send()
                .await?
        }
        Commands::Delete { resource, id } => {
            client
                .delete(endpoint(&cli.url, &resource, Some(&id)))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error: service returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("http://h:1/", "/widget/", None),
            "http://h:1/widget"
        );
        assert_eq!(
            endpoint("http://h:1", "widget", Some("abc")),
            "http://h:1/widget/abc"
        );
    }
}
