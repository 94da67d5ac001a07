//! # Minuta CLI
//!
//! Usage:
//!   minuta input.json -o output.pdf
//!   echo '{ ... }' | minuta -o output.pdf
//!   minuta --example > demanda.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        match fs::read_to_string(&args[1]) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("✗ Failed to read {}: {}", args[1], err);
                process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut buf) {
            eprintln!("✗ Failed to read stdin: {}", err);
            process::exit(1);
        }
        buf
    };

    // Parse output path; the report's suggested filename is the default.
    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());

    match minuta::render_json(&input) {
        Ok(rendered) => {
            let path = output_path.unwrap_or_else(|| rendered.filename.clone());
            if let Err(err) = rendered.write_to(&path) {
                eprintln!("✗ Failed to write {}: {}", path, err);
                process::exit(1);
            }
            eprintln!(
                "✓ Written {} pages ({} bytes) to {}",
                rendered.page_count,
                rendered.bytes.len(),
                path
            );
        }
        Err(err) => {
            eprintln!("✗ {}", err);
            process::exit(1);
        }
    }
}

fn example_report_json() -> &'static str {
    r##"{
  "meta": {
    "title": "FORMALIZAÇÃO DE DEMANDA Nº 042/2026",
    "author": "Prefeitura Municipal de Itaguara - Setor de Compras",
    "filename": "formalizacao-042-2026.pdf",
    "generatedAt": "Gerado em 14/02/2026 às 09:30"
  },
  "sections": [
    {
      "title": "1. OBJETO",
      "body": {
        "type": "text",
        "text": "Aquisição de materiais de expediente para atender às necessidades das secretarias municipais durante o exercício de 2026."
      }
    },
    {
      "title": "2. JUSTIFICATIVA DA NECESSIDADE",
      "body": {
        "type": "text",
        "text": "O estoque atual do almoxarifado central encontra-se abaixo do nível mínimo de segurança. A reposição é indispensável para a continuidade dos serviços administrativos prestados à população, conforme levantamento anexo ao processo."
      }
    },
    {
      "title": "3. DADOS DO REQUISITANTE",
      "body": {
        "type": "keyValueList",
        "entries": [
          { "key": "Órgão", "value": "Secretaria Municipal de Administração" },
          { "key": "Responsável", "value": "Maria da Silva" },
          { "key": "E-mail", "value": "compras@itaguara.mg.gov.br" },
          { "key": "Telefone", "value": "" }
        ]
      }
    },
    {
      "title": "4. DESCRIÇÃO DOS ITENS",
      "subtitle": "Valores estimados conforme pesquisa de preços",
      "body": {
        "type": "table",
        "missingValue": "[A DEFINIR]",
        "columns": [
          { "key": "item", "label": "ITEM", "width": 12, "kind": "numeric" },
          { "key": "descricao", "label": "DESCRIÇÃO", "width": 78 },
          { "key": "unidade", "label": "UNID.", "width": 20 },
          { "key": "quantidade", "label": "QTDE.", "width": 20, "kind": "numeric" },
          { "key": "valorUnitario", "label": "VALOR UNIT.", "width": 30, "kind": "currency" },
          { "key": "valorTotal", "label": "VALOR TOTAL", "width": 30, "kind": "currency" }
        ],
        "rows": [
          {
            "item": 1,
            "descricao": "Papel A4 75g/m², pacote com 500 folhas",
            "unidade": "Pacote",
            "quantidade": 200,
            "valorUnitario": 24.9,
            "valorTotal": 4980
          },
          {
            "item": 2,
            "descricao": "Caneta esferográfica azul, escrita média",
            "unidade": "Caixa",
            "quantidade": 50,
            "valorUnitario": 32.5,
            "valorTotal": 1625
          },
          {
            "item": 3,
            "descricao": "Tôner para impressora laser monocromática, compatível com o parque instalado",
            "unidade": "Unidade",
            "quantidade": 30
          }
        ]
      }
    },
    {
      "title": "5. RESULTADOS PRETENDIDOS",
      "body": {
        "type": "text",
        "text": ""
      }
    }
  ]
}"##
}
